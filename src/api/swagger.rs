use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Smart Campus API",
        version = "1.0.0",
        description = "Campus backend: announcements, events, clubs, polls, resources, feedback and lost & found.\n\n**Authentication:** sign in through `/auth/google/{role}`; every `/api` endpoint expects the issued JWT as a Bearer token.\n\nAll responses use the envelope `{ success, message, data }`."
    ),
    paths(
        // Health
        crate::api::health::health_check,

        // Auth & users
        crate::api::auth::google_login,
        crate::api::auth::google_callback,
        crate::api::users::me,

        // Announcements
        crate::api::announcements::list_announcements,
        crate::api::announcements::create_announcement,
        crate::api::announcements::delete_announcement,

        // Events
        crate::api::events::list_events,
        crate::api::events::create_event,
        crate::api::events::rsvp,
        crate::api::events::update_own_event,
        crate::api::events::delete_own_event,

        // Clubs
        crate::api::clubs::list_clubs,
        crate::api::clubs::create_club,
        crate::api::clubs::delete_club,
        crate::api::clubs::join_club,
        crate::api::clubs::leave_club,

        // Polls
        crate::api::polls::list_polls,
        crate::api::polls::create_poll,
        crate::api::polls::vote,

        // Resources
        crate::api::resources::list_resources,
        crate::api::resources::record_download,
        crate::api::resources::create_resource,
        crate::api::resources::update_own_resource,
        crate::api::resources::delete_own_resource,

        // Feedback
        crate::api::feedback::submit_feedback,
        crate::api::feedback::list_feedback,
        crate::api::feedback::respond_to_feedback,

        // Lost & found
        crate::api::lost_found::list_lost_items,
        crate::api::lost_found::report_lost_item,
        crate::api::lost_found::update_status,

        // Dashboards
        crate::api::dashboard::student_dashboard,
        crate::api::dashboard::teacher_dashboard,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::models::Role,
            crate::models::CreateAnnouncementRequest,
            crate::models::CreateEventRequest,
            crate::models::UpdateEventRequest,
            crate::models::CreateClubRequest,
            crate::models::CreatePollRequest,
            crate::models::PollOptionInput,
            crate::models::KeyedOptionInput,
            crate::models::VoteRequest,
            crate::models::CreateResourceRequest,
            crate::models::UpdateResourceRequest,
            crate::models::SubmitFeedbackRequest,
            crate::models::RespondFeedbackRequest,
            crate::models::FeedbackStatus,
            crate::models::UpdateLostStatusRequest,
            crate::models::LostStatus,
        )
    ),
    tags(
        (name = "Health", description = "Liveness endpoint."),
        (name = "Auth", description = "Google OAuth sign-in per role."),
        (name = "Users", description = "Current user profile."),
        (name = "Announcements", description = "Campus announcements. Admins publish."),
        (name = "Events", description = "Campus events and RSVPs."),
        (name = "Clubs", description = "Clubs and student membership."),
        (name = "Polls", description = "Polls with one vote per user."),
        (name = "Resources", description = "Study resources shared by teachers."),
        (name = "Feedback", description = "Feedback from students and staff responses."),
        (name = "Lost & Found", description = "Lost and found reports with optional images."),
        (name = "Dashboard", description = "Role dashboards."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT issued by the OAuth callback"))
                        .build()
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/polls/{id}/vote"));
        assert!(doc.paths.paths.contains_key("/auth/google/{role}"));
        assert!(doc.paths.paths.contains_key("/api/student/clubs/{id}/leave"));
        assert!(doc.paths.paths.contains_key("/api/teacher/resources/{id}"));
        assert!(doc.paths.paths.contains_key("/api/lost-found"));
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
