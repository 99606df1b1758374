//! PRISM: a proposal submission and review portal backend.

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod notify;
pub mod store;
