pub mod api;
pub mod attributes;
pub mod config;
pub mod database;
pub mod http;
pub mod notify;
pub mod prediction;
pub mod service;
pub mod types;
pub mod utils;
pub mod verify;
pub mod zodiac;

pub use http::{AppState, router};
pub use service::{LotteryService, SharedConnection};
