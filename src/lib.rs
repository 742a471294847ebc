pub mod api;
pub mod ci_detection;
pub mod cli;
pub mod commands;
pub mod config;
pub mod discover;
pub mod error;
pub mod git;
pub mod tags;
pub mod ui;
pub mod upload;
pub mod validate;
