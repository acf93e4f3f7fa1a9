use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use serde::{Deserialize, Serialize};

use crate::utils::validation::{clean, parse_date, require_fields, to_bson_date, to_iso};
use crate::utils::CampusError;

pub const DEFAULT_EVENT_CATEGORY: &str = "General";

/// Collection "events"
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub date: BsonDateTime,
    pub location: String,
    pub category: String,
    pub created_by: Option<ObjectId>,
    #[serde(default)]
    pub attendees: Vec<ObjectId>,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

impl Event {
    pub fn has_attendee(&self, user: &ObjectId) -> bool {
        self.attendees.contains(user)
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
}

impl CreateEventRequest {
    /// Validates the payload; nothing is written when this fails.
    pub fn into_event(self, creator: ObjectId, now: BsonDateTime) -> Result<Event, CampusError> {
        let title = clean(self.title.as_deref());
        let description = clean(self.description.as_deref());
        let date = clean(self.date.as_deref());
        let location = clean(self.location.as_deref());

        require_fields(&[
            ("title", title.as_deref()),
            ("description", description.as_deref()),
            ("date", date.as_deref()),
            ("location", location.as_deref()),
        ])?;

        let date = date
            .as_deref()
            .and_then(parse_date)
            .ok_or_else(|| CampusError::validation("Invalid event date"))?;

        Ok(Event {
            id: None,
            title: title.unwrap_or_default(),
            description: description.unwrap_or_default(),
            date: to_bson_date(date),
            location: location.unwrap_or_default(),
            category: clean(self.category.as_deref()).unwrap_or_else(|| DEFAULT_EVENT_CATEGORY.to_string()),
            created_by: Some(creator),
            attendees: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
}

impl UpdateEventRequest {
    /// Builds the `$set` document; provided fields may not be blank.
    pub fn into_update(self, now: BsonDateTime) -> Result<Document, CampusError> {
        let mut set = Document::new();

        for (field, value) in [
            ("title", self.title),
            ("description", self.description),
            ("location", self.location),
            ("category", self.category),
        ] {
            if let Some(raw) = value {
                let cleaned = clean(Some(&raw))
                    .ok_or_else(|| CampusError::Validation(format!("Event {} cannot be empty", field)))?;
                set.insert(field, cleaned);
            }
        }

        if let Some(raw) = self.date {
            let parsed = parse_date(&raw).ok_or_else(|| CampusError::validation("Invalid event date"))?;
            set.insert("date", to_bson_date(parsed));
        }

        if set.is_empty() {
            return Err(CampusError::validation("No event fields to update"));
        }

        set.insert("updated_at", now);
        Ok(doc! { "$set": set })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub location: String,
    pub category: String,
    pub created_by: Option<String>,
    pub attendees: Vec<String>,
    pub attendee_count: usize,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        EventResponse {
            id: event.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: event.title,
            description: event.description,
            date: to_iso(event.date),
            location: event.location,
            category: event.category,
            created_by: event.created_by.map(|id| id.to_hex()),
            attendee_count: event.attendees.len(),
            attendees: event.attendees.iter().map(|id| id.to_hex()).collect(),
            created_at: to_iso(event.created_at),
            updated_at: to_iso(event.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(date: &str) -> CreateEventRequest {
        CreateEventRequest {
            title: Some(" Tech Fest ".into()),
            description: Some("Annual fest".into()),
            date: Some(date.into()),
            location: Some("Main Hall".into()),
            category: None,
        }
    }

    #[test]
    fn test_create_event_defaults_category() {
        let creator = ObjectId::new();
        let event = request("2030-03-10T09:00:00Z").into_event(creator, BsonDateTime::now()).unwrap();

        assert_eq!(event.title, "Tech Fest");
        assert_eq!(event.category, DEFAULT_EVENT_CATEGORY);
        assert_eq!(event.created_by, Some(creator));
        assert!(event.attendees.is_empty());
    }

    #[test]
    fn test_create_event_rejects_unparseable_date() {
        let err = request("someday soon").into_event(ObjectId::new(), BsonDateTime::now()).unwrap_err();
        assert!(matches!(err, CampusError::Validation(_)));
        assert_eq!(err.to_string(), "Invalid event date");
    }

    #[test]
    fn test_create_event_requires_fields() {
        let mut req = request("2030-03-10");
        req.location = Some("   ".into());
        let err = req.into_event(ObjectId::new(), BsonDateTime::now()).unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: location");
    }

    #[test]
    fn test_update_event_document() {
        let update = UpdateEventRequest {
            title: Some(" Renamed ".into()),
            date: Some("2030-04-01".into()),
            ..Default::default()
        }
        .into_update(BsonDateTime::now())
        .unwrap();

        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("title").unwrap(), "Renamed");
        assert!(set.get_datetime("date").is_ok());
        assert!(set.contains_key("updated_at"));
        assert!(!set.contains_key("location"));
    }

    #[test]
    fn test_update_event_rejects_bad_input() {
        let err = UpdateEventRequest { title: Some("".into()), ..Default::default() }
            .into_update(BsonDateTime::now())
            .unwrap_err();
        assert_eq!(err.to_string(), "Event title cannot be empty");

        let err = UpdateEventRequest { date: Some("tomorrow-ish".into()), ..Default::default() }
            .into_update(BsonDateTime::now())
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid event date");

        assert!(UpdateEventRequest::default().into_update(BsonDateTime::now()).is_err());
    }

    #[test]
    fn test_event_response_counts_attendees() {
        let user = ObjectId::new();
        let mut event = request("2030-03-10").into_event(ObjectId::new(), BsonDateTime::now()).unwrap();
        event.attendees.push(user);
        assert!(event.has_attendee(&user));

        let response = EventResponse::from(event);
        assert_eq!(response.attendee_count, 1);
        assert_eq!(response.attendees, vec![user.to_hex()]);
    }
}
