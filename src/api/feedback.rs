use actix_web::{web, HttpResponse};

use crate::{
    database::MongoDB,
    models::{Principal, RespondFeedbackRequest, SubmitFeedbackRequest},
    services::feedback_service,
    utils::{created, ok, validation::parse_object_id, CampusError},
};

#[utoipa::path(
    post,
    path = "/api/feedback",
    tag = "Feedback",
    request_body = SubmitFeedbackRequest,
    responses(
        (status = 201, description = "Feedback submitted"),
        (status = 400, description = "Missing category or description")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_feedback(
    principal: web::ReqData<Principal>,
    db: web::Data<MongoDB>,
    body: web::Json<SubmitFeedbackRequest>,
) -> Result<HttpResponse, CampusError> {
    let feedback = feedback_service::submit_feedback(&db, &principal, body.into_inner()).await?;
    Ok(created("Feedback submitted", feedback))
}

#[utoipa::path(
    get,
    path = "/api/feedback",
    tag = "Feedback",
    responses((status = 200, description = "Own feedback for students, everything for staff")),
    security(("bearer_auth" = []))
)]
pub async fn list_feedback(principal: web::ReqData<Principal>, db: web::Data<MongoDB>) -> Result<HttpResponse, CampusError> {
    let feedback = feedback_service::list_feedback(&db, &principal).await?;
    Ok(ok("Feedback fetched", feedback))
}

#[utoipa::path(
    post,
    path = "/api/teacher/feedback/{id}/respond",
    tag = "Feedback",
    params(("id" = String, Path, description = "Feedback id")),
    request_body = RespondFeedbackRequest,
    responses(
        (status = 200, description = "Response saved"),
        (status = 400, description = "Response message is required"),
        (status = 404, description = "Feedback not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn respond_to_feedback(
    principal: web::ReqData<Principal>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
    body: web::Json<RespondFeedbackRequest>,
) -> Result<HttpResponse, CampusError> {
    let id = parse_object_id(&path, "Feedback")?;
    let feedback = feedback_service::respond_to_feedback(&db, &principal, id, body.into_inner()).await?;
    Ok(ok("Feedback updated", feedback))
}
