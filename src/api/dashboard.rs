use actix_web::{web, HttpResponse};

use crate::{
    database::MongoDB,
    models::Principal,
    services::dashboard_service,
    utils::{ok, CampusError},
};

#[utoipa::path(
    get,
    path = "/api/student/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "joinedClubs, activeEvents, availableResources, openPolls"),
        (status = 403, description = "Students only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn student_dashboard(
    principal: web::ReqData<Principal>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, CampusError> {
    let summary = dashboard_service::student_dashboard(&db, &principal).await?;
    Ok(ok(summary.message, summary.data))
}

#[utoipa::path(
    get,
    path = "/api/teacher/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "managedEvents, uploadedResources, pendingFeedback, teacherProfile"),
        (status = 403, description = "Teachers only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn teacher_dashboard(
    principal: web::ReqData<Principal>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, CampusError> {
    let summary = dashboard_service::teacher_dashboard(&db, &principal).await?;
    Ok(ok(summary.message, summary.data))
}
