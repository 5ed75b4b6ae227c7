pub mod auth;
pub mod events;
pub mod projects;
pub mod tasks;
pub mod users;
