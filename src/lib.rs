pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod notify;
pub mod tracker;
pub mod usf;
pub mod utils;
