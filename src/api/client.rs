use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::types::{DateRange, RequestItem, TimeClock, UserId};

use super::payload::{
    Ack, DetailsPayload, Envelope, Mutation, RequestsPayload, ResourcesPayload, UsersPayload,
};
use super::TimeClockApi;

/// Blocking client for the Belcka REST API. Cheap to clone.
#[derive(Clone, Debug)]
pub struct HttpClient {
    http: Client,
    base_url: String,
    token: String,
}

impl HttpClient {
    pub fn new(config: &Config) -> ApiResult<Self> {
        let token = config.token.clone().ok_or(ApiError::MissingToken)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("timeclock/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
    }

    fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        context: &str,
    ) -> ApiResult<Envelope<T>> {
        debug!(context, endpoint, "api_get");
        let response = self
            .authorized(self.http.get(self.url(endpoint)))
            .query(query)
            .send()
            .map_err(|err| {
                error!(context, error = %err, "api_request_failed");
                ApiError::Request(err)
            })?;
        read_envelope(response, context)
    }

    fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
        context: &str,
    ) -> ApiResult<Envelope<T>> {
        info!(context, endpoint, "api_post");
        let response = self
            .authorized(self.http.post(self.url(endpoint)))
            .json(body)
            .send()
            .map_err(|err| {
                error!(context, error = %err, "api_request_failed");
                ApiError::Request(err)
            })?;
        read_envelope(response, context)
    }
}

fn range_query(user_id: UserId, range: &DateRange) -> Vec<(&'static str, String)> {
    vec![
        ("user_id", user_id.to_string()),
        ("start_date", range.wire_start()),
        ("end_date", range.wire_end()),
    ]
}

/// Checks the HTTP status, decodes the envelope and rejects `IsSuccess: false`.
fn read_envelope<T: DeserializeOwned>(response: Response, context: &str) -> ApiResult<Envelope<T>> {
    let status = response.status();
    let bytes = response.bytes()?;
    if !status.is_success() {
        let body = String::from_utf8_lossy(&bytes).into_owned();
        error!(context, %status, body = %body, "api_error_status");
        return Err(ApiError::Status {
            context: context.to_string(),
            status,
            body,
        });
    }
    let envelope: Envelope<T> = serde_json::from_slice(&bytes).map_err(|source| {
        error!(context, error = %source, "api_decode_failed");
        ApiError::Decode {
            context: context.to_string(),
            source,
        }
    })?;
    if !envelope.is_success {
        let message = envelope
            .message
            .clone()
            .unwrap_or_else(|| format!("{context} was not accepted"));
        warn!(context, message = %message, "api_rejected");
        return Err(ApiError::Rejected(message));
    }
    Ok(envelope)
}

impl TimeClockApi for HttpClient {
    fn users(&self, range: &DateRange) -> ApiResult<Vec<TimeClock>> {
        let query = [
            ("start_date", range.wire_start()),
            ("end_date", range.wire_end()),
        ];
        let envelope: Envelope<UsersPayload> = self.get("/time-clock/list", &query, "users")?;
        Ok(envelope.body.info)
    }

    fn details(&self, user_id: UserId, range: &DateRange) -> ApiResult<DetailsPayload> {
        let envelope: Envelope<DetailsPayload> = self.get(
            "/time-clock/details",
            &range_query(user_id, range),
            "details",
        )?;
        Ok(envelope.body)
    }

    fn resources(&self, company_id: Option<u32>) -> ApiResult<ResourcesPayload> {
        let query = company_id
            .map(|id| vec![("companyId", id.to_string())])
            .unwrap_or_default();
        let envelope: Envelope<ResourcesPayload> =
            self.get("/time-clock/resources", &query, "resources")?;
        Ok(envelope.body)
    }

    fn request_details(&self, user_id: UserId, range: &DateRange) -> ApiResult<Vec<RequestItem>> {
        let envelope: Envelope<RequestsPayload> = self.get(
            "/time-clock/request-details",
            &range_query(user_id, range),
            "request details",
        )?;
        Ok(envelope.body.info)
    }

    fn send(&self, mutation: &Mutation) -> ApiResult<String> {
        let body = mutation.body().map_err(|source| ApiError::Encode {
            context: mutation.endpoint().to_string(),
            source,
        })?;
        let envelope: Envelope<Ack> = self.post(mutation.endpoint(), &body, mutation.endpoint())?;
        Ok(envelope
            .message
            .unwrap_or_else(|| mutation.success_text().to_string()))
    }
}
