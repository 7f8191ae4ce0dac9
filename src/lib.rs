pub mod actors;
pub mod clock;
pub mod config;
pub mod engine;
pub mod models;
pub mod reports;
pub mod settings;
pub mod storage;
pub mod types;
