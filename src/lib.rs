pub mod config;
pub mod db;
pub mod error;
pub mod gemini;
pub mod http_client;
pub mod leveling;
pub mod middleware;
pub mod models;
pub mod pronunciation;
pub mod quiz;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
