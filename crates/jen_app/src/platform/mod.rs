pub mod commands;
pub mod config;
pub mod effects;
pub mod logging;
