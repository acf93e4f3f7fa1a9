use chrono::Utc;
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::validation::{clean, is_student_id, parse_date, require_fields, to_bson_date, to_iso};
use crate::utils::CampusError;

pub const DEFAULT_LOST_ITEM_CATEGORY: &str = "Others";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LostStatus {
    #[default]
    Lost,
    Found,
    Claimed,
}

impl LostStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "lost" => Some(LostStatus::Lost),
            "found" => Some(LostStatus::Found),
            "claimed" => Some(LostStatus::Claimed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LostStatus::Lost => "lost",
            LostStatus::Found => "found",
            LostStatus::Claimed => "claimed",
        }
    }
}

impl fmt::Display for LostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collection "lost_items"
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LostItem {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub date: BsonDateTime,
    #[serde(default)]
    pub status: LostStatus,
    #[serde(default)]
    pub image_url: String,
    /// Always ten digits
    pub student_id: String,
    pub reported_by: Option<ObjectId>,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

/// Text parts of the multipart report form.
#[derive(Debug, Default, Clone)]
pub struct LostItemForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub status: Option<String>,
    pub image_url: Option<String>,
    pub student_id: Option<String>,
}

impl LostItemForm {
    /// Stores a text part by its form name; unknown parts are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "title" => &mut self.title,
            "description" => &mut self.description,
            "category" => &mut self.category,
            "location" => &mut self.location,
            "date" => &mut self.date,
            "status" => &mut self.status,
            "imageUrl" | "image_url" => &mut self.image_url,
            "studentId" | "student_id" => &mut self.student_id,
            _ => return,
        };
        *slot = Some(value);
    }

    /// Validates the form. Checked before any uploaded image is written, so a
    /// rejected report leaves nothing behind.
    pub fn validate(&self) -> Result<(), CampusError> {
        require_fields(&[
            ("title", self.title.as_deref()),
            ("description", self.description.as_deref()),
            ("location", self.location.as_deref()),
            ("studentId", self.student_id.as_deref()),
        ])?;

        let student_id = self.student_id.as_deref().map(str::trim).unwrap_or_default();
        if !is_student_id(student_id) {
            return Err(CampusError::validation("Student ID must be a 10-digit number"));
        }
        Ok(())
    }

    /// `uploaded_image` wins over any `imageUrl` text part.
    pub fn into_item(
        self,
        reporter: Option<ObjectId>,
        uploaded_image: Option<String>,
        now: BsonDateTime,
    ) -> Result<LostItem, CampusError> {
        self.validate()?;

        let date = self
            .date
            .as_deref()
            .and_then(parse_date)
            .unwrap_or_else(Utc::now);
        let status = self.status.as_deref().and_then(LostStatus::parse).unwrap_or_default();
        let image_url = uploaded_image
            .or_else(|| clean(self.image_url.as_deref()))
            .unwrap_or_default();

        Ok(LostItem {
            id: None,
            title: clean(self.title.as_deref()).unwrap_or_default(),
            description: clean(self.description.as_deref()).unwrap_or_default(),
            category: clean(self.category.as_deref())
                .unwrap_or_else(|| DEFAULT_LOST_ITEM_CATEGORY.to_string()),
            location: clean(self.location.as_deref()).unwrap_or_default(),
            date: to_bson_date(date),
            status,
            image_url,
            student_id: clean(self.student_id.as_deref()).unwrap_or_default(),
            reported_by: reporter,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateLostStatusRequest {
    pub status: Option<String>,
}

impl UpdateLostStatusRequest {
    pub fn status(&self) -> Result<LostStatus, CampusError> {
        self.status
            .as_deref()
            .and_then(LostStatus::parse)
            .ok_or_else(|| CampusError::validation("Invalid status"))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LostItemResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub date: String,
    pub status: LostStatus,
    pub image_url: String,
    pub student_id: String,
    pub reported_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<LostItem> for LostItemResponse {
    fn from(item: LostItem) -> Self {
        LostItemResponse {
            id: item.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: item.title,
            description: item.description,
            category: item.category,
            location: item.location,
            date: to_iso(item.date),
            status: item.status,
            image_url: item.image_url,
            student_id: item.student_id,
            reported_by: item.reported_by.map(|id| id.to_hex()),
            created_at: to_iso(item.created_at),
            updated_at: to_iso(item.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(student_id: &str) -> LostItemForm {
        let mut form = LostItemForm::default();
        form.set("title", "Blue bottle".into());
        form.set("description", "Steel, dented".into());
        form.set("location", "Library".into());
        form.set("studentId", student_id.into());
        form
    }

    #[test]
    fn test_student_id_must_have_ten_digits() {
        let err = form("12345").into_item(None, None, BsonDateTime::now()).unwrap_err();
        assert!(matches!(err, CampusError::Validation(_)));
        assert_eq!(err.to_string(), "Student ID must be a 10-digit number");

        assert!(form("12345abcde").validate().is_err());
        assert!(form(" 2310030001 ").validate().is_ok());
    }

    #[test]
    fn test_defaults_applied() {
        let before = Utc::now().timestamp_millis();
        let mut f = form("2310030001");
        f.set("date", "not a date".into());
        f.set("status", "misplaced".into());

        let item = f.into_item(Some(ObjectId::new()), None, BsonDateTime::now()).unwrap();
        assert_eq!(item.status, LostStatus::Lost);
        assert_eq!(item.category, DEFAULT_LOST_ITEM_CATEGORY);
        assert!(item.date.timestamp_millis() >= before);
        assert_eq!(item.image_url, "");
    }

    #[test]
    fn test_uploaded_image_overrides_text_url() {
        let mut f = form("2310030001");
        f.set("imageUrl", "https://elsewhere/pic.png".into());
        f.set("status", "Found".into());
        f.set("unknown", "ignored".into());

        let item = f
            .into_item(None, Some("/uploads/lost-found/1-a.png".into()), BsonDateTime::now())
            .unwrap();
        assert_eq!(item.image_url, "/uploads/lost-found/1-a.png");
        assert_eq!(item.status, LostStatus::Found);
    }

    #[test]
    fn test_missing_fields_named() {
        let mut f = LostItemForm::default();
        f.set("title", "Keys".into());
        let err = f.validate().unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: description, location, studentId");
    }

    #[test]
    fn test_status_update_request() {
        let req = UpdateLostStatusRequest { status: Some("CLAIMED".into()) };
        assert_eq!(req.status().unwrap(), LostStatus::Claimed);

        let req = UpdateLostStatusRequest { status: Some("gone".into()) };
        assert_eq!(req.status().unwrap_err().to_string(), "Invalid status");
    }
}
