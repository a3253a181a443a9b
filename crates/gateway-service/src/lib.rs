pub mod auth;
pub mod comment;
pub mod communication;
pub mod crypto;
pub mod delegation;
pub mod dependent;
pub mod error;
pub mod feedback;
pub mod note;
pub mod notification;
pub mod patient;
pub mod profile;
