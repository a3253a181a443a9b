pub mod comment;
pub mod communication;
pub mod delegation;
pub mod email;
pub mod note;
pub mod notification;
pub mod resource_delegate;
pub mod user_feedback;
pub mod user_profile;
