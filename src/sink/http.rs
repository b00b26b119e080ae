use std::time::Duration;

use serde::Deserialize;

use crate::error::{PipelineError, PipelineResult};
use crate::types::CanonicalRecord;

use super::RecordSink;

/// Success body of the ingestion API. Only `inserted` is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InsertResponse {
    #[serde(default)]
    pub inserted: u64,
    #[serde(default)]
    pub message: Option<String>,
}

/// POSTs each batch as a JSON array to the ingestion API.
///
/// - 2xx: the `inserted` count from the response body is returned (0 if the body has none)
/// - other statuses: [`PipelineError::HttpStatus`] with the response body
/// - connection/transport failures: [`PipelineError::Http`]
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpSink {
    /// Sink with the transport's default timeout.
    pub fn new(endpoint: impl Into<String>) -> PipelineResult<Self> {
        Self::with_timeout(endpoint, None)
    }

    /// Sink with an explicit per-request timeout (`None` keeps the transport default).
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Option<Duration>) -> PipelineResult<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(concat!("sdg-ingest/", env!("CARGO_PKG_VERSION")));
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RecordSink for HttpSink {
    fn send_batch(&mut self, batch: &[CanonicalRecord]) -> PipelineResult<u64> {
        let resp = self.client.post(&self.endpoint).json(batch).send()?;
        let status = resp.status();
        let body = resp.text()?;

        if !status.is_success() {
            return Err(PipelineError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<InsertResponse>(&body) {
            Ok(parsed) => Ok(parsed.inserted),
            Err(e) => {
                tracing::warn!(
                    target: "sdg_ingest",
                    endpoint = %self.endpoint,
                    error = %e,
                    "ingestion api response has no readable inserted count"
                );
                Ok(0)
            }
        }
    }
}
