//! Authentication: access tokens, password hashing, and request extractors.

pub mod current_user;
pub mod password;
pub mod token;

pub use current_user::{AuthenticatedUser, MaybeUser};
