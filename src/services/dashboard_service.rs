use crate::{
    database::{self, MongoDB},
    models::{FeedbackStatus, Principal, StudentProfile, TeacherProfile},
    utils::CampusError,
};
use mongodb::bson::{doc, DateTime as BsonDateTime, Document};
use serde::Serialize;

/// Dashboard payload plus the envelope message describing it.
#[derive(Debug)]
pub struct DashboardSummary<T> {
    pub message: &'static str,
    pub data: T,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudentDashboard {
    pub joined_clubs: u64,
    pub active_events: u64,
    pub available_resources: u64,
    pub open_polls: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherProfileSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub designation: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDashboard {
    pub managed_events: u64,
    pub uploaded_resources: u64,
    pub pending_feedback: u64,
    pub teacher_profile: Option<TeacherProfileSummary>,
}

async fn count(db: &MongoDB, collection: &str, filter: Document) -> Result<u64, CampusError> {
    Ok(db.collection::<Document>(collection).count_documents(filter).await?)
}

/// Counts for the student home screen. A missing profile still yields the
/// global counts, with zero joined clubs.
pub async fn student_dashboard(
    db: &MongoDB,
    principal: &Principal,
) -> Result<DashboardSummary<StudentDashboard>, CampusError> {
    let now = BsonDateTime::now();

    let (profile, active_events, available_resources, open_polls) = futures::try_join!(
        async {
            Ok::<_, CampusError>(
                db.collection::<StudentProfile>(database::STUDENTS)
                    .find_one(doc! { "user": principal.id })
                    .await?,
            )
        },
        count(db, database::EVENTS, doc! { "date": { "$gte": now } }),
        count(db, database::RESOURCES, doc! {}),
        count(db, database::POLLS, doc! { "end_date": { "$gte": now } }),
    )?;

    let message = if profile.is_some() {
        "Student dashboard summary"
    } else {
        "Student profile not found, returning default metrics"
    };

    Ok(DashboardSummary {
        message,
        data: StudentDashboard {
            joined_clubs: profile.map(|p| p.joined_clubs.len() as u64).unwrap_or(0),
            active_events,
            available_resources,
            open_polls,
        },
    })
}

pub async fn teacher_dashboard(
    db: &MongoDB,
    principal: &Principal,
) -> Result<DashboardSummary<TeacherDashboard>, CampusError> {
    let (profile, managed_events, uploaded_resources, pending_feedback) = futures::try_join!(
        async {
            Ok::<_, CampusError>(
                db.collection::<TeacherProfile>(database::TEACHERS)
                    .find_one(doc! { "user": principal.id })
                    .await?,
            )
        },
        count(db, database::EVENTS, doc! { "created_by": principal.id }),
        count(db, database::RESOURCES, doc! { "uploaded_by": principal.id }),
        count(db, database::FEEDBACK, doc! { "status": FeedbackStatus::Submitted.as_str() }),
    )?;

    let message = if profile.is_some() {
        "Teacher dashboard summary"
    } else {
        "Teacher profile not found, returning default metrics"
    };

    let teacher_profile = profile.map(|p| TeacherProfileSummary {
        id: p.id.map(|id| id.to_hex()).unwrap_or_default(),
        name: p.name,
        email: p.email,
        department: p.department,
        designation: p.designation,
    });

    Ok(DashboardSummary {
        message,
        data: TeacherDashboard {
            managed_events,
            uploaded_resources,
            pending_feedback,
            teacher_profile,
        },
    })
}
