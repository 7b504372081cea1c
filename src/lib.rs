pub mod ads;
pub mod client;
pub mod clipboard;
pub mod config;
pub mod consent;
pub mod errors;
pub mod export;
pub mod format;
pub mod history;
pub mod logging;
pub mod model;
pub mod orchestrator;
pub mod storage;
pub mod ui;
