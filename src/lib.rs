pub mod api;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pairs;
pub mod price_feed;
pub mod transform;
