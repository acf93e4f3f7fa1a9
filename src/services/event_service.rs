use crate::{
    database::{self, MongoDB},
    models::{CreateEventRequest, Event, EventResponse, Principal, Role, UpdateEventRequest},
    utils::CampusError,
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::options::ReturnDocument;

pub async fn list_events(db: &MongoDB) -> Result<Vec<EventResponse>, CampusError> {
    let events: Vec<Event> = db
        .collection::<Event>(database::EVENTS)
        .find(doc! {})
        .sort(doc! { "date": 1 })
        .await?
        .try_collect()
        .await?;

    Ok(events.into_iter().map(EventResponse::from).collect())
}

/// Validates before writing; teacher creators also get the event in their
/// managed list.
pub async fn create_event(
    db: &MongoDB,
    principal: &Principal,
    request: CreateEventRequest,
) -> Result<EventResponse, CampusError> {
    let mut event = request.into_event(principal.id, BsonDateTime::now())?;

    let result = db.collection::<Event>(database::EVENTS).insert_one(&event).await?;
    event.id = result.inserted_id.as_object_id();

    if principal.role == Role::Teacher {
        if let Some(event_id) = event.id {
            db.collection::<Document>(database::TEACHERS)
                .update_one(
                    doc! { "user": principal.id },
                    doc! { "$addToSet": { "managed_events": event_id } },
                )
                .await?;
        }
    }

    log::info!("📅 Event created: {} by {}", event.title, principal.email);
    Ok(EventResponse::from(event))
}

/// Outcome of an RSVP. `already_attending` is informational only.
#[derive(Debug)]
pub struct Rsvp {
    pub event: EventResponse,
    pub already_attending: bool,
}

/// Adds the caller to the attendees. Repeating it is a successful no-op.
pub async fn rsvp(db: &MongoDB, principal: &Principal, event_id: ObjectId) -> Result<Rsvp, CampusError> {
    let mut event = db
        .collection::<Event>(database::EVENTS)
        .find_one_and_update(
            doc! { "_id": event_id },
            doc! { "$addToSet": { "attendees": principal.id } },
        )
        .return_document(ReturnDocument::Before)
        .await?
        .ok_or_else(|| CampusError::not_found("Event"))?;

    let already_attending = event.has_attendee(&principal.id);
    if !already_attending {
        event.attendees.push(principal.id);
    }

    Ok(Rsvp {
        event: EventResponse::from(event),
        already_attending,
    })
}

/// Updates an event the caller created. Someone else's event is reported as missing.
pub async fn update_own_event(
    db: &MongoDB,
    principal: &Principal,
    event_id: ObjectId,
    request: UpdateEventRequest,
) -> Result<EventResponse, CampusError> {
    let update = request.into_update(BsonDateTime::now())?;

    let event = db
        .collection::<Event>(database::EVENTS)
        .find_one_and_update(doc! { "_id": event_id, "created_by": principal.id }, update)
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| CampusError::not_found("Event"))?;

    log::info!("✏️ Event updated: {}", event.title);
    Ok(EventResponse::from(event))
}

pub async fn delete_own_event(db: &MongoDB, principal: &Principal, event_id: ObjectId) -> Result<(), CampusError> {
    let event = db
        .collection::<Event>(database::EVENTS)
        .find_one_and_delete(doc! { "_id": event_id, "created_by": principal.id })
        .await?
        .ok_or_else(|| CampusError::not_found("Event"))?;

    db.collection::<Document>(database::TEACHERS)
        .update_many(doc! { "managed_events": event_id }, doc! { "$pull": { "managed_events": event_id } })
        .await?;
    db.collection::<Document>(database::CLUBS)
        .update_many(doc! { "events_hosted": event_id }, doc! { "$pull": { "events_hosted": event_id } })
        .await?;

    log::info!("🗑️ Event deleted: {}", event.title);
    Ok(())
}
