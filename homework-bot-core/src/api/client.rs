//! HTTP client for the homework status endpoint

use super::HomeworkApi;
use crate::error::{PollError, RequestInfo, ResponseError};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Body keys through which the API reports an error
const ERROR_KEYS: [&str; 2] = ["code", "error"];

/// Client for the homework status API. Never log the token.
pub struct PracticumClient {
    endpoint: String,
    token: String,
    client: Client,
}

impl PracticumClient {
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            token: token.into(),
            client,
        })
    }

    fn request_info(&self, from_date: i64) -> RequestInfo {
        RequestInfo {
            url: self.endpoint.clone(),
            from_date,
        }
    }
}

/// First error key present in the body, with its value rendered as text.
fn reported_error(body: &Value) -> Option<(String, String)> {
    let object = body.as_object()?;
    ERROR_KEYS.iter().find_map(|key| {
        object.get(*key).map(|value| {
            let text = value
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string());
            (key.to_string(), text)
        })
    })
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    async fn get_api_answer(&self, from_date: i64) -> Result<Value, PollError> {
        let request = self.request_info(from_date);

        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|source| PollError::Connectivity {
                request: request.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| PollError::Connectivity {
                request: request.clone(),
                source,
            })?;
        let parsed = serde_json::from_str::<Value>(&body);

        // An explicit error in the body wins over the status code.
        if let Some((key, value)) = parsed.as_ref().ok().and_then(reported_error) {
            return Err(PollError::RemoteReported {
                key,
                value,
                request,
            });
        }

        if status != StatusCode::OK {
            return Err(PollError::Protocol {
                status: status.as_u16(),
                request,
            });
        }

        let json = parsed.map_err(|e| ResponseError::NotJson(e.to_string()))?;
        tracing::debug!(from_date, "Homework API answered");
        Ok(json)
    }
}
