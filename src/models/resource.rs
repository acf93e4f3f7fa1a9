use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use serde::{Deserialize, Serialize};

use crate::models::Principal;
use crate::utils::validation::{clean, require_fields, to_iso};
use crate::utils::CampusError;

/// Collection "resources"
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Resource {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub department: String,
    pub semester: String,
    pub uploaded_by: ObjectId,
    pub uploader_name: String,
    #[serde(default)]
    pub downloads: i64,
    #[serde(default)]
    pub file_url: String,
    pub uploaded_at: BsonDateTime,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    pub department: Option<String>,
    pub semester: Option<String>,
    #[serde(alias = "file_url")]
    pub file_url: Option<String>,
}

impl CreateResourceRequest {
    pub fn into_resource(self, uploader: &Principal, now: BsonDateTime) -> Result<Resource, CampusError> {
        let title = clean(self.title.as_deref());
        let resource_type = clean(self.resource_type.as_deref());
        let department = clean(self.department.as_deref());
        let semester = clean(self.semester.as_deref());

        require_fields(&[
            ("title", title.as_deref()),
            ("type", resource_type.as_deref()),
            ("department", department.as_deref()),
            ("semester", semester.as_deref()),
        ])?;

        Ok(Resource {
            id: None,
            title: title.unwrap_or_default(),
            resource_type: resource_type.unwrap_or_default(),
            department: department.unwrap_or_default(),
            semester: semester.unwrap_or_default(),
            uploaded_by: uploader.id,
            uploader_name: uploader.name.clone(),
            downloads: 0,
            file_url: clean(self.file_url.as_deref()).unwrap_or_default(),
            uploaded_at: now,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResourceRequest {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    pub department: Option<String>,
    pub semester: Option<String>,
    #[serde(alias = "file_url")]
    pub file_url: Option<String>,
}

impl UpdateResourceRequest {
    /// `$set` document for the provided fields. Metadata fields cannot be blanked;
    /// the file URL may be cleared.
    pub fn into_update(self, now: BsonDateTime) -> Result<Document, CampusError> {
        let mut set = Document::new();

        for (field, value) in [
            ("title", self.title),
            ("type", self.resource_type),
            ("department", self.department),
            ("semester", self.semester),
        ] {
            if let Some(raw) = value {
                let cleaned = clean(Some(&raw))
                    .ok_or_else(|| CampusError::validation("Resource fields cannot be empty"))?;
                set.insert(field, cleaned);
            }
        }

        if let Some(raw) = self.file_url {
            set.insert("file_url", raw.trim());
        }

        if set.is_empty() {
            return Err(CampusError::validation("No resource fields to update"));
        }

        set.insert("updated_at", now);
        Ok(doc! { "$set": set })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub department: String,
    pub semester: String,
    pub uploaded_by: String,
    pub uploader_name: String,
    pub downloads: i64,
    pub file_url: String,
    pub uploaded_at: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Resource> for ResourceResponse {
    fn from(r: Resource) -> Self {
        ResourceResponse {
            id: r.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: r.title,
            resource_type: r.resource_type,
            department: r.department,
            semester: r.semester,
            uploaded_by: r.uploaded_by.to_hex(),
            uploader_name: r.uploader_name,
            downloads: r.downloads,
            file_url: r.file_url,
            uploaded_at: to_iso(r.uploaded_at),
            created_at: to_iso(r.created_at),
            updated_at: to_iso(r.updated_at),
        }
    }
}
