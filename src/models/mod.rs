pub mod announcement;
pub mod club;
pub mod event;
pub mod feedback;
pub mod lost_item;
pub mod poll;
pub mod profile;
pub mod resource;
pub mod user;

pub use announcement::*;
pub use club::*;
pub use event::*;
pub use feedback::*;
pub use lost_item::*;
pub use poll::*;
pub use profile::*;
pub use resource::*;
pub use user::*;
