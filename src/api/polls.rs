use actix_web::{web, HttpResponse};

use crate::{
    database::MongoDB,
    models::{CreatePollRequest, Principal, VoteRequest},
    services::poll_service,
    utils::{created, ok, validation::parse_object_id, CampusError},
};

#[utoipa::path(
    get,
    path = "/api/polls",
    tag = "Polls",
    responses((status = 200, description = "Newest first, with totals and the caller's vote")),
    security(("bearer_auth" = []))
)]
pub async fn list_polls(principal: web::ReqData<Principal>, db: web::Data<MongoDB>) -> Result<HttpResponse, CampusError> {
    let polls = poll_service::list_polls(&db, &principal).await?;
    Ok(ok("Polls fetched", polls))
}

#[utoipa::path(
    post,
    path = "/api/polls",
    tag = "Polls",
    request_body = CreatePollRequest,
    responses(
        (status = 201, description = "Poll created"),
        (status = 400, description = "Missing question, fewer than two options, duplicate keys or invalid end date")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_poll(
    principal: web::ReqData<Principal>,
    db: web::Data<MongoDB>,
    body: web::Json<CreatePollRequest>,
) -> Result<HttpResponse, CampusError> {
    log::info!("🗳️ POST /api/polls - by {}", principal.email);
    let poll = poll_service::create_poll(&db, &principal, body.into_inner()).await?;
    Ok(created("Poll created", poll))
}

#[utoipa::path(
    post,
    path = "/api/polls/{id}/vote",
    tag = "Polls",
    params(("id" = String, Path, description = "Poll id")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Vote recorded"),
        (status = 400, description = "Missing option key, user already voted, or invalid option"),
        (status = 404, description = "Poll not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn vote(
    principal: web::ReqData<Principal>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
    body: web::Json<VoteRequest>,
) -> Result<HttpResponse, CampusError> {
    let poll_id = parse_object_id(&path, "Poll")?;

    match poll_service::vote(&db, &principal, poll_id, body.option_key.as_deref()).await {
        Ok(poll) => Ok(ok("Vote recorded", poll)),
        Err(e) => {
            log::warn!("🗳️ Vote on {} by {} rejected: {}", poll_id, principal.email, e);
            Err(e)
        }
    }
}
