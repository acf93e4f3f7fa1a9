use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use crate::models::Role;

pub const DEFAULT_STUDENT_DEPARTMENT: &str = "CSE";
pub const DEFAULT_STUDENT_YEAR: &str = "1";
pub const DEFAULT_TEACHER_DEPARTMENT: &str = "General";
pub const DEFAULT_TEACHER_DESIGNATION: &str = "Faculty";

/// Collection "students", one document per student user.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StudentProfile {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user: ObjectId,
    pub name: String,
    pub email: String,
    pub google_id: String,
    #[serde(default)]
    pub profile_pic: String,
    pub role: Role,
    pub department: String,
    pub year: String,
    #[serde(default)]
    pub joined_clubs: Vec<ObjectId>,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

/// Collection "teachers", one document per teacher user.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TeacherProfile {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user: ObjectId,
    pub name: String,
    pub email: String,
    pub google_id: String,
    #[serde(default)]
    pub profile_pic: String,
    pub role: Role,
    pub department: String,
    pub designation: String,
    #[serde(default)]
    pub managed_events: Vec<ObjectId>,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubSummary {
    pub id: String,
    pub name: String,
    pub category: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: String,
    pub title: String,
    pub date: String,
    pub location: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetails {
    pub name: String,
    pub email: String,
    pub department: String,
    pub year: String,
    pub profile_pic: String,
    pub joined_clubs: Vec<ClubSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDetails {
    pub name: String,
    pub email: String,
    pub department: String,
    pub designation: String,
    pub profile_pic: String,
    pub managed_events: Vec<EventSummary>,
}
