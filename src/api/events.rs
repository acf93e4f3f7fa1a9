use actix_web::{web, HttpResponse};

use crate::{
    database::MongoDB,
    models::{CreateEventRequest, Principal, UpdateEventRequest},
    services::event_service,
    utils::{created, ok, ok_empty, validation::parse_object_id, CampusError},
};

#[utoipa::path(
    get,
    path = "/api/events",
    tag = "Events",
    responses((status = 200, description = "Events by date ascending")),
    security(("bearer_auth" = []))
)]
pub async fn list_events(db: web::Data<MongoDB>) -> Result<HttpResponse, CampusError> {
    let events = event_service::list_events(&db).await?;
    Ok(ok("Events fetched", events))
}

#[utoipa::path(
    post,
    path = "/api/events",
    tag = "Events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created"),
        (status = 400, description = "Missing fields or invalid date"),
        (status = 403, description = "Teachers and admins only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_event(
    principal: web::ReqData<Principal>,
    db: web::Data<MongoDB>,
    body: web::Json<CreateEventRequest>,
) -> Result<HttpResponse, CampusError> {
    log::info!("📅 POST /api/events - by {} ({})", principal.email, principal.role);
    let event = event_service::create_event(&db, &principal, body.into_inner()).await?;
    Ok(created("Event created", event))
}

#[utoipa::path(
    post,
    path = "/api/events/{id}/rsvp",
    tag = "Events",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "RSVP recorded, repeating it is a no-op"),
        (status = 404, description = "Event not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn rsvp(
    principal: web::ReqData<Principal>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, CampusError> {
    let event_id = parse_object_id(&path, "Event")?;
    let outcome = event_service::rsvp(&db, &principal, event_id).await?;

    let message = if outcome.already_attending { "Already RSVP'd" } else { "RSVP recorded" };
    Ok(ok(message, outcome.event))
}

#[utoipa::path(
    patch,
    path = "/api/teacher/events/{id}",
    tag = "Events",
    params(("id" = String, Path, description = "Event id")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated"),
        (status = 400, description = "No fields to update, or a blank required field"),
        (status = 404, description = "No event with this id created by the caller")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_own_event(
    principal: web::ReqData<Principal>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
    body: web::Json<UpdateEventRequest>,
) -> Result<HttpResponse, CampusError> {
    let event_id = parse_object_id(&path, "Event")?;
    let event = event_service::update_own_event(&db, &principal, event_id, body.into_inner()).await?;
    Ok(ok("Event updated", event))
}

#[utoipa::path(
    delete,
    path = "/api/teacher/events/{id}",
    tag = "Events",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event deleted"),
        (status = 404, description = "No event with this id created by the caller")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_own_event(
    principal: web::ReqData<Principal>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, CampusError> {
    let event_id = parse_object_id(&path, "Event")?;
    event_service::delete_own_event(&db, &principal, event_id).await?;
    Ok(ok_empty("Event deleted"))
}
