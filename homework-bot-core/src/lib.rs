//! # Homework Bot Core Library
//!
//! Polls the homework review API for status changes and relays them to a Telegram chat.

pub mod api;
pub mod error;
pub mod models;
pub mod poller;
pub mod providers;
pub mod services;

pub use error::{ConfigError, DeliveryError, PollError, RequestInfo, ResponseError};
pub use poller::{PollOutcome, Poller};
