pub mod app;
pub mod config;
pub mod dialogue;
pub mod handler;
pub mod report;
pub mod twiml;
pub mod version;
