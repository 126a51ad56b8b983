//! Core domain + application logic for the price tracker bot.
//!
//! This crate is framework-agnostic. Telegram, the tracker backend and the
//! HTTP surface live behind ports implemented in adapter crates.

pub mod bot;
pub mod command;
pub mod config;
pub mod domain;
pub mod envelope;
pub mod errors;
pub mod logging;
pub mod messaging;
pub mod ports;

pub use errors::{Error, Result};
