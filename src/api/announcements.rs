use actix_web::{web, HttpResponse};

use crate::{
    database::MongoDB,
    models::{CreateAnnouncementRequest, Principal},
    services::announcement_service,
    utils::{created, ok, ok_empty, validation::parse_object_id, CampusError},
};

#[utoipa::path(
    get,
    path = "/api/announcements",
    tag = "Announcements",
    responses((status = 200, description = "Pinned first, then newest")),
    security(("bearer_auth" = []))
)]
pub async fn list_announcements(db: web::Data<MongoDB>) -> Result<HttpResponse, CampusError> {
    let announcements = announcement_service::list_announcements(&db).await?;
    Ok(ok("Announcements fetched", announcements))
}

#[utoipa::path(
    post,
    path = "/api/announcements",
    tag = "Announcements",
    request_body = CreateAnnouncementRequest,
    responses(
        (status = 201, description = "Announcement created"),
        (status = 400, description = "Missing title or content"),
        (status = 403, description = "Admins only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_announcement(
    principal: web::ReqData<Principal>,
    db: web::Data<MongoDB>,
    body: web::Json<CreateAnnouncementRequest>,
) -> Result<HttpResponse, CampusError> {
    log::info!("📢 POST /api/announcements - by {}", principal.email);
    let announcement = announcement_service::create_announcement(&db, &principal, body.into_inner()).await?;
    Ok(created("Announcement created", announcement))
}

#[utoipa::path(
    delete,
    path = "/api/announcements/{id}",
    tag = "Announcements",
    params(("id" = String, Path, description = "Announcement id")),
    responses(
        (status = 200, description = "Announcement deleted"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Announcement not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_announcement(
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, CampusError> {
    let id = parse_object_id(&path, "Announcement")?;
    announcement_service::delete_announcement(&db, id).await?;
    Ok(ok_empty("Announcement deleted"))
}
