pub mod config;
pub mod error;
pub mod migration;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{AppError, AppResult};
