#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod command;
pub mod commands;
pub mod config;
pub mod constants;
pub mod envdir;
pub mod error;
pub mod manifest;
pub mod ui;
