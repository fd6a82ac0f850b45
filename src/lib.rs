pub mod core;
pub mod handlers;
pub mod models;
pub mod stores;
pub mod utils;
