use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};

use crate::{
    config::{AppConfig, MAX_UPLOAD_BYTES},
    database::MongoDB,
    models::{Principal, UpdateLostStatusRequest},
    services::lost_found_service,
    utils::{created, ok, validation::parse_object_id, CampusError},
};

#[utoipa::path(
    get,
    path = "/api/lost-found",
    tag = "Lost & Found",
    responses((status = 200, description = "Newest first")),
    security(("bearer_auth" = []))
)]
pub async fn list_lost_items(db: web::Data<MongoDB>) -> Result<HttpResponse, CampusError> {
    let items = lost_found_service::list_lost_items(&db).await?;
    Ok(ok("Items fetched", items))
}

/// Multipart report: text fields plus an optional `image` part.
#[utoipa::path(
    post,
    path = "/api/lost-found",
    tag = "Lost & Found",
    responses(
        (status = 201, description = "Item submitted. Body is multipart/form-data: title, description, category, location, date, status, studentId, imageUrl and an optional image part"),
        (status = 400, description = "Missing fields, invalid student id, non-image upload or file too large")
    ),
    security(("bearer_auth" = []))
)]
pub async fn report_lost_item(
    principal: web::ReqData<Principal>,
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    payload: Multipart,
) -> Result<HttpResponse, CampusError> {
    let report = lost_found_service::read_report(payload, MAX_UPLOAD_BYTES).await?;
    let item = lost_found_service::create_lost_item(&db, &config, &principal, report).await?;
    Ok(created("Item submitted", item))
}

#[utoipa::path(
    patch,
    path = "/api/lost-found/{id}/status",
    tag = "Lost & Found",
    params(("id" = String, Path, description = "Item id")),
    request_body = UpdateLostStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Teachers and admins only"),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_status(
    path: web::Path<String>,
    db: web::Data<MongoDB>,
    body: web::Json<UpdateLostStatusRequest>,
) -> Result<HttpResponse, CampusError> {
    let id = parse_object_id(&path, "Item")?;
    let item = lost_found_service::update_status(&db, id, body.into_inner()).await?;
    Ok(ok("Status updated", item))
}
