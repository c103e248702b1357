//! Homework review statuses and their human-readable verdicts

use crate::error::{PollError, ResponseError};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Review status reported by the homework API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub const ALL: [HomeworkStatus; 3] = [
        HomeworkStatus::Approved,
        HomeworkStatus::Reviewing,
        HomeworkStatus::Rejected,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }

    /// Verdict sentence shown to the user
    pub fn verdict(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => {
                "The work has been reviewed: the reviewer liked everything. Hooray!"
            }
            HomeworkStatus::Reviewing => "The work has been taken for review by the reviewer.",
            HomeworkStatus::Rejected => "The work has been reviewed: the reviewer has comments.",
        }
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for HomeworkStatus {
    type Err = PollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HomeworkStatus::ALL
            .into_iter()
            .find(|status| status.code() == s)
            .ok_or_else(|| PollError::UnknownStatus(s.to_string()))
    }
}

/// Format the "status changed" notification for a homework name and status
pub fn status_change_message(homework_name: &str, status: HomeworkStatus) -> String {
    format!(
        "The review status of \"{}\" has changed. {}",
        homework_name,
        status.verdict()
    )
}

fn string_field<'a>(homework: &'a Value, key: &'static str) -> Result<&'a str, ResponseError> {
    match homework.get(key) {
        None => Err(ResponseError::MissingKey(key)),
        Some(value) => value.as_str().ok_or(ResponseError::NotAString { key }),
    }
}

/// Render the notification for one homework record.
///
/// Fails with `UnknownStatus` when the status is outside the verdict table, and with
/// `MalformedResponse` when `homework_name` or `status` is missing or not a string.
pub fn parse_status(homework: &Value) -> Result<String, PollError> {
    if !homework.is_object() {
        return Err(ResponseError::NotAnObject {
            found: crate::error::json_type_name(homework),
        }
        .into());
    }
    let homework_name = string_field(homework, "homework_name")?;
    let status: HomeworkStatus = string_field(homework, "status")?.parse()?;
    Ok(status_change_message(homework_name, status))
}
