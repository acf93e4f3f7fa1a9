use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::validation::{clean, require_fields, to_iso};
use crate::utils::CampusError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    #[default]
    Submitted,
    InReview,
    Resolved,
}

impl FeedbackStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "submitted" => Some(FeedbackStatus::Submitted),
            "in_review" => Some(FeedbackStatus::InReview),
            "resolved" => Some(FeedbackStatus::Resolved),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackStatus::Submitted => "submitted",
            FeedbackStatus::InReview => "in_review",
            FeedbackStatus::Resolved => "resolved",
        }
    }
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collection "feedback"
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Feedback {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub status: FeedbackStatus,
    pub submitted_by: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responded_by: Option<ObjectId>,
    pub submitted_at: BsonDateTime,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SubmitFeedbackRequest {
    pub category: Option<String>,
    pub description: Option<String>,
}

impl SubmitFeedbackRequest {
    pub fn into_feedback(self, submitter: ObjectId, now: BsonDateTime) -> Result<Feedback, CampusError> {
        let category = clean(self.category.as_deref());
        let description = clean(self.description.as_deref());

        require_fields(&[("category", category.as_deref()), ("description", description.as_deref())])?;

        Ok(Feedback {
            id: None,
            category: category.unwrap_or_default(),
            description: description.unwrap_or_default(),
            status: FeedbackStatus::Submitted,
            submitted_by: submitter,
            response: None,
            responded_by: None,
            submitted_at: now,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RespondFeedbackRequest {
    pub response: Option<String>,
    pub status: Option<String>,
}

impl RespondFeedbackRequest {
    /// Response text is mandatory; an unknown or missing status falls back to `in_review`.
    pub fn normalize(&self) -> Result<(String, FeedbackStatus), CampusError> {
        let response = clean(self.response.as_deref())
            .ok_or_else(|| CampusError::validation("Response message is required"))?;
        let status = self
            .status
            .as_deref()
            .and_then(FeedbackStatus::parse)
            .unwrap_or(FeedbackStatus::InReview);
        Ok((response, status))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub category: String,
    pub description: String,
    pub status: FeedbackStatus,
    pub submitted_by: String,
    pub response: Option<String>,
    pub responded_by: Option<String>,
    pub submitted_at: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Feedback> for FeedbackResponse {
    fn from(f: Feedback) -> Self {
        FeedbackResponse {
            id: f.id.map(|id| id.to_hex()).unwrap_or_default(),
            category: f.category,
            description: f.description,
            status: f.status,
            submitted_by: f.submitted_by.to_hex(),
            response: f.response,
            responded_by: f.responded_by.map(|id| id.to_hex()),
            submitted_at: to_iso(f.submitted_at),
            created_at: to_iso(f.created_at),
            updated_at: to_iso(f.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_and_wire_format() {
        assert_eq!(FeedbackStatus::parse(" In_Review "), Some(FeedbackStatus::InReview));
        assert_eq!(FeedbackStatus::parse("closed"), None);
        assert_eq!(serde_json::to_value(FeedbackStatus::InReview).unwrap(), "in_review");
    }

    #[test]
    fn test_submit_feedback_starts_submitted() {
        let submitter = ObjectId::new();
        let feedback = SubmitFeedbackRequest {
            category: Some("Infrastructure".into()),
            description: Some(" Wifi drops in block C ".into()),
        }
        .into_feedback(submitter, BsonDateTime::now())
        .unwrap();

        assert_eq!(feedback.status, FeedbackStatus::Submitted);
        assert_eq!(feedback.description, "Wifi drops in block C");
        assert_eq!(feedback.submitted_by, submitter);
        assert!(feedback.response.is_none());
    }

    #[test]
    fn test_respond_defaults_to_in_review() {
        let req = RespondFeedbackRequest { response: Some("Looking into it".into()), status: Some("bogus".into()) };
        assert_eq!(req.normalize().unwrap().1, FeedbackStatus::InReview);

        let req = RespondFeedbackRequest { response: Some("Fixed".into()), status: Some("RESOLVED".into()) };
        assert_eq!(req.normalize().unwrap(), ("Fixed".to_string(), FeedbackStatus::Resolved));

        let req = RespondFeedbackRequest { response: Some("   ".into()), status: None };
        assert_eq!(req.normalize().unwrap_err().to_string(), "Response message is required");
    }
}
