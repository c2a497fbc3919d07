//! replay a repository's commit history in a headless browser and capture
//! its canvas output into a visual timeline

pub mod browser;
pub mod capture;
pub mod cli;
pub mod config;
pub mod constants;
pub mod history;
pub mod report;
pub mod server;
pub mod stage;
pub mod ui;
