use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::utils::validation::{clean, require_fields, to_iso};
use crate::utils::CampusError;

/// Collection "clubs"
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Club {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub description: String,
    pub category: String,
    /// User references; kept duplicate free with `$addToSet`
    #[serde(default)]
    pub members: Vec<ObjectId>,
    #[serde(default)]
    pub events_hosted: Vec<ObjectId>,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

impl Club {
    pub fn has_member(&self, user: &ObjectId) -> bool {
        self.members.contains(user)
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateClubRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl CreateClubRequest {
    pub fn into_club(self, now: BsonDateTime) -> Result<Club, CampusError> {
        let name = clean(self.name.as_deref());
        let description = clean(self.description.as_deref());
        let category = clean(self.category.as_deref());

        require_fields(&[
            ("name", name.as_deref()),
            ("description", description.as_deref()),
            ("category", category.as_deref()),
        ])?;

        Ok(Club {
            id: None,
            name: name.unwrap_or_default(),
            description: description.unwrap_or_default(),
            category: category.unwrap_or_default(),
            members: Vec::new(),
            events_hosted: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Club as the client sees it; counts are computed from the reference lists.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub members: usize,
    pub member_count: usize,
    pub event_count: usize,
    pub joined: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl ClubResponse {
    pub fn from_club(club: Club, joined_clubs: &HashSet<ObjectId>) -> Self {
        ClubResponse {
            id: club.id.map(|id| id.to_hex()).unwrap_or_default(),
            joined: club.id.map(|id| joined_clubs.contains(&id)).unwrap_or(false),
            name: club.name,
            description: club.description,
            category: club.category,
            members: club.members.len(),
            member_count: club.members.len(),
            event_count: club.events_hosted.len(),
            created_at: to_iso(club.created_at),
            updated_at: to_iso(club.updated_at),
        }
    }
}
