pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod feeds;
pub mod middleware;
pub mod services;
