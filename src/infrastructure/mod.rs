pub mod auth;
pub mod config;
pub mod db;
pub mod identity;
pub mod password;
pub mod repositories;
pub mod state;
