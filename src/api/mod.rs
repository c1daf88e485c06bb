/// Belcka REST API: endpoint payloads and the blocking HTTP client.
mod client;
mod payload;

use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::error::ApiResult;
use crate::types::{DateRange, RequestItem, TimeClock, UserId};

pub use client::HttpClient;
pub use payload::{
    Ack, AddWorklogBody, DetailsPayload, EditProjectBody, EditShiftBody, EditWorklogBody,
    Envelope, IdsBody, Mutation, RequestDecisionBody, RequestsPayload, ResourcesPayload,
    UsersPayload, WEB_DEVICE_MODEL, WEB_DEVICE_TYPE, join_ids,
};

/// Retries after the first failed request-list fetch.
pub const REQUEST_FETCH_RETRIES: u32 = 2;
pub const REQUEST_FETCH_DELAY: Duration = Duration::from_secs(1);

/// The calls the editor makes. [`HttpClient`] is the real implementation.
pub trait TimeClockApi: Send + Sync {
    fn users(&self, range: &DateRange) -> ApiResult<Vec<TimeClock>>;

    fn details(&self, user_id: UserId, range: &DateRange) -> ApiResult<DetailsPayload>;

    fn resources(&self, company_id: Option<u32>) -> ApiResult<ResourcesPayload>;

    fn request_details(&self, user_id: UserId, range: &DateRange) -> ApiResult<Vec<RequestItem>>;

    /// Sends a mutation and returns the server's message, if any.
    fn send(&self, mutation: &Mutation) -> ApiResult<String>;
}

/// Runs `fetch`, retrying up to `retries` more times with `delay` in between.
pub fn fetch_with_retry<T>(
    mut fetch: impl FnMut() -> ApiResult<T>,
    retries: u32,
    delay: Duration,
) -> ApiResult<T> {
    let mut attempt = 0;
    loop {
        match fetch() {
            Ok(value) => return Ok(value),
            Err(err) if attempt < retries => {
                attempt += 1;
                warn!(attempt, error = %err, "fetch_retry");
                thread::sleep(delay);
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn retry_gives_up_after_the_budget() {
        let mut calls = 0;
        let result: ApiResult<()> = fetch_with_retry(
            || {
                calls += 1;
                Err(ApiError::Rejected("busy".to_string()))
            },
            2,
            Duration::ZERO,
        );
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[test]
    fn retry_returns_first_success() {
        let mut calls = 0;
        let result = fetch_with_retry(
            || {
                calls += 1;
                if calls < 2 {
                    Err(ApiError::Rejected("busy".to_string()))
                } else {
                    Ok(calls)
                }
            },
            2,
            Duration::ZERO,
        );
        assert_eq!(result.unwrap(), 2);
    }
}
