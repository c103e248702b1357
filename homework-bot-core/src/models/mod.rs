//! Data models for homework-bot

pub mod configuration;
pub mod credentials;
pub mod homework;

pub use configuration::*;
pub use credentials::*;
pub use homework::*;
