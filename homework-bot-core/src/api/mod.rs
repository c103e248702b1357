//! Homework status API: fetching and response validation

mod client;
mod response;

pub use client::PracticumClient;
pub use response::{check_response, HOMEWORKS_KEY};

use crate::error::PollError;
use async_trait::async_trait;
use serde_json::Value;

/// Source of homework status responses.
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    /// Fetch statuses changed since `from_date` (Unix timestamp). Returns the raw JSON body.
    async fn get_api_answer(&self, from_date: i64) -> Result<Value, PollError>;
}
