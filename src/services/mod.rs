pub mod announcement_service;
pub mod auth_service;
pub mod club_service;
pub mod dashboard_service;
pub mod event_service;
pub mod feedback_service;
pub mod identity_provider;
pub mod lost_found_service;
pub mod poll_service;
pub mod resource_service;

pub use identity_provider::{GoogleIdentityProvider, IdentityProvider};
