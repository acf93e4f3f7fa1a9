use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Campus role, re-derived from the requested OAuth state on every login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    /// Maps the OAuth `state` parameter to a role. Anything unrecognised is a student.
    pub fn from_state(state: Option<&str>) -> Role {
        match state.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("teacher") => Role::Teacher,
            Some("admin") => Role::Admin,
            _ => Role::Student,
        }
    }

    /// Strict parse, used for route segments such as `/auth/google/{role}`.
    pub fn parse(value: &str) -> Option<Role> {
        match value.trim().to_lowercase().as_str() {
            "student" => Some(Role::Student),
            "teacher" => Some(Role::Teacher),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Collection "users"
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    pub google_id: String,
    #[serde(default)]
    pub profile_pic: String,
    pub role: Role,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

/// Authenticated identity attached to every `/api` request.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn from_user(user: &User) -> Option<Principal> {
        Some(Principal {
            id: user.id?,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub profile_pic: String,
    pub role_details: Option<serde_json::Value>,
}
