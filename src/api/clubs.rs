use actix_web::{web, HttpResponse};

use crate::{
    database::MongoDB,
    models::{CreateClubRequest, Principal},
    services::club_service::{self, Membership},
    utils::{created, ok, ok_empty, validation::parse_object_id, CampusError},
};

#[utoipa::path(
    get,
    path = "/api/clubs",
    tag = "Clubs",
    responses((status = 200, description = "Clubs with member counts; `joined` set for students")),
    security(("bearer_auth" = []))
)]
pub async fn list_clubs(principal: web::ReqData<Principal>, db: web::Data<MongoDB>) -> Result<HttpResponse, CampusError> {
    let clubs = club_service::list_clubs(&db, &principal).await?;
    Ok(ok("Clubs fetched", clubs))
}

#[utoipa::path(
    post,
    path = "/api/clubs",
    tag = "Clubs",
    request_body = CreateClubRequest,
    responses(
        (status = 201, description = "Club created"),
        (status = 403, description = "Admins only"),
        (status = 409, description = "A club with this name already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_club(db: web::Data<MongoDB>, body: web::Json<CreateClubRequest>) -> Result<HttpResponse, CampusError> {
    let club = club_service::create_club(&db, body.into_inner()).await?;
    Ok(created("Club created", club))
}

#[utoipa::path(
    delete,
    path = "/api/clubs/{id}",
    tag = "Clubs",
    params(("id" = String, Path, description = "Club id")),
    responses(
        (status = 200, description = "Club deleted and removed from every student"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Club not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_club(path: web::Path<String>, db: web::Data<MongoDB>) -> Result<HttpResponse, CampusError> {
    let club_id = parse_object_id(&path, "Club")?;
    club_service::delete_club(&db, club_id).await?;
    Ok(ok_empty("Club deleted"))
}

#[utoipa::path(
    post,
    path = "/api/student/clubs/{id}/join",
    tag = "Clubs",
    params(("id" = String, Path, description = "Club id")),
    responses(
        (status = 200, description = "Joined club, joining twice changes nothing"),
        (status = 404, description = "Club or student profile not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn join_club(
    principal: web::ReqData<Principal>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, CampusError> {
    let club_id = parse_object_id(&path, "Club")?;
    let club = club_service::toggle_membership(&db, &principal, club_id, Membership::Join).await?;
    Ok(ok("Joined club", club))
}

#[utoipa::path(
    post,
    path = "/api/student/clubs/{id}/leave",
    tag = "Clubs",
    params(("id" = String, Path, description = "Club id")),
    responses(
        (status = 200, description = "Left club, leaving twice changes nothing"),
        (status = 404, description = "Club or student profile not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn leave_club(
    principal: web::ReqData<Principal>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, CampusError> {
    let club_id = parse_object_id(&path, "Club")?;
    let club = club_service::toggle_membership(&db, &principal, club_id, Membership::Leave).await?;
    Ok(ok("Left club", club))
}
