pub mod auth;
pub mod projects;
pub mod tasks;
pub mod users;
