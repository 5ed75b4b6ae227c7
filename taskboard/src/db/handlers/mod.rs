pub mod projects;
pub mod repository;
pub mod tasks;
pub mod users;

pub use projects::Projects;
pub use repository::Repository;
pub use tasks::Tasks;
pub use users::Users;
