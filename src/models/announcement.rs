use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use crate::utils::validation::{clean, require_fields, to_iso};
use crate::utils::CampusError;

pub const DEFAULT_ANNOUNCEMENT_CATEGORY: &str = "General";

/// Collection "announcements"
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Announcement {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub is_pinned: bool,
    /// Display name of the poster
    pub posted_by: String,
    pub posted_at: BsonDateTime,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnouncementRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    #[serde(default, alias = "is_pinned")]
    pub is_pinned: bool,
}

impl CreateAnnouncementRequest {
    pub fn into_announcement(self, poster: &str, now: BsonDateTime) -> Result<Announcement, CampusError> {
        let title = clean(self.title.as_deref());
        let content = clean(self.content.as_deref());

        require_fields(&[("title", title.as_deref()), ("content", content.as_deref())])?;

        Ok(Announcement {
            id: None,
            title: title.unwrap_or_default(),
            content: content.unwrap_or_default(),
            category: clean(self.category.as_deref())
                .unwrap_or_else(|| DEFAULT_ANNOUNCEMENT_CATEGORY.to_string()),
            is_pinned: self.is_pinned,
            posted_by: poster.to_string(),
            posted_at: now,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub is_pinned: bool,
    pub posted_by: String,
    pub posted_at: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Announcement> for AnnouncementResponse {
    fn from(a: Announcement) -> Self {
        AnnouncementResponse {
            id: a.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: a.title,
            content: a.content,
            category: a.category,
            is_pinned: a.is_pinned,
            posted_by: a.posted_by,
            posted_at: to_iso(a.posted_at),
            created_at: to_iso(a.created_at),
            updated_at: to_iso(a.updated_at),
        }
    }
}
