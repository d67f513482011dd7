pub mod config;
pub mod context;
pub mod issues;
pub mod llm;
pub mod models;
pub mod report;
pub mod stages;
pub mod utils;

pub use config::Config;
