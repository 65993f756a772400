//! Core domain + application logic for the Koro number-desk bot.
//!
//! This crate is intentionally framework-agnostic. Telegram / Twilio live
//! behind ports (traits) implemented in adapter crates.

pub mod callback;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod phone;
pub mod provisioning;
pub mod state;

pub use errors::{Error, Result};
