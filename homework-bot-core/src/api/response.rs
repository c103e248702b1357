//! Response shape validation

use crate::error::{json_type_name, ResponseError};
use serde_json::Value;

/// Key holding the list of homework records
pub const HOMEWORKS_KEY: &str = "homeworks";

/// Check that the response is an object with a `homeworks` list and return that list.
///
/// An empty list is valid and means nothing changed since the watermark.
pub fn check_response(response: &Value) -> Result<&[Value], ResponseError> {
    let object = response.as_object().ok_or(ResponseError::NotAnObject {
        found: json_type_name(response),
    })?;
    let homeworks = object
        .get(HOMEWORKS_KEY)
        .ok_or(ResponseError::MissingKey(HOMEWORKS_KEY))?;
    let homeworks = homeworks.as_array().ok_or(ResponseError::NotAList {
        key: HOMEWORKS_KEY,
        found: json_type_name(homeworks),
    })?;
    if homeworks.is_empty() {
        tracing::debug!("No new statuses in the response");
    }
    Ok(homeworks.as_slice())
}
