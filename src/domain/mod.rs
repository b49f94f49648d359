pub mod auth;
pub mod identity;
pub mod password;
pub mod users;
