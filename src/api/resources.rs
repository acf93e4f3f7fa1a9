use actix_web::{web, HttpResponse};

use crate::{
    database::MongoDB,
    models::{CreateResourceRequest, Principal, UpdateResourceRequest},
    services::resource_service,
    utils::{created, ok, ok_empty, validation::parse_object_id, CampusError},
};

#[utoipa::path(
    get,
    path = "/api/resources",
    tag = "Resources",
    responses((status = 200, description = "Newest first")),
    security(("bearer_auth" = []))
)]
pub async fn list_resources(db: web::Data<MongoDB>) -> Result<HttpResponse, CampusError> {
    let resources = resource_service::list_resources(&db).await?;
    Ok(ok("Resources fetched", resources))
}

#[utoipa::path(
    post,
    path = "/api/resources/{id}/download",
    tag = "Resources",
    params(("id" = String, Path, description = "Resource id")),
    responses(
        (status = 200, description = "Download counter incremented"),
        (status = 404, description = "Resource not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn record_download(path: web::Path<String>, db: web::Data<MongoDB>) -> Result<HttpResponse, CampusError> {
    let id = parse_object_id(&path, "Resource")?;
    let resource = resource_service::record_download(&db, id).await?;
    Ok(ok("Download recorded", resource))
}

#[utoipa::path(
    post,
    path = "/api/teacher/resources",
    tag = "Resources",
    request_body = CreateResourceRequest,
    responses(
        (status = 201, description = "Resource created"),
        (status = 400, description = "Missing fields"),
        (status = 403, description = "Teachers only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_resource(
    principal: web::ReqData<Principal>,
    db: web::Data<MongoDB>,
    body: web::Json<CreateResourceRequest>,
) -> Result<HttpResponse, CampusError> {
    let resource = resource_service::create_resource(&db, &principal, body.into_inner()).await?;
    Ok(created("Resource created", resource))
}

#[utoipa::path(
    patch,
    path = "/api/teacher/resources/{id}",
    tag = "Resources",
    params(("id" = String, Path, description = "Resource id")),
    request_body = UpdateResourceRequest,
    responses(
        (status = 200, description = "Resource updated"),
        (status = 400, description = "No fields to update, or a blank field"),
        (status = 404, description = "No resource with this id uploaded by the caller")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_own_resource(
    principal: web::ReqData<Principal>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
    body: web::Json<UpdateResourceRequest>,
) -> Result<HttpResponse, CampusError> {
    let id = parse_object_id(&path, "Resource")?;
    let resource = resource_service::update_own_resource(&db, &principal, id, body.into_inner()).await?;
    Ok(ok("Resource updated", resource))
}

#[utoipa::path(
    delete,
    path = "/api/teacher/resources/{id}",
    tag = "Resources",
    params(("id" = String, Path, description = "Resource id")),
    responses(
        (status = 200, description = "Resource deleted"),
        (status = 404, description = "No resource with this id uploaded by the caller")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_own_resource(
    principal: web::ReqData<Principal>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, CampusError> {
    let id = parse_object_id(&path, "Resource")?;
    resource_service::delete_own_resource(&db, &principal, id).await?;
    Ok(ok_empty("Resource deleted"))
}
