pub mod api_types;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod workflow;
