use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode, Url};
use tracing::{info, warn};

use super::payload::SheetPayload;
use super::{SubmissionOutcome, SurveySink};
use crate::survey::domain::PropertyRecord;

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("spreadsheet endpoint '{url}' is not a valid http(s) URL")]
    InvalidEndpoint { url: String },
    #[error("spreadsheet request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("spreadsheet endpoint answered {0}")]
    Status(StatusCode),
}

/// HTTP client for the spreadsheet-backed ingestion script.
///
/// Posts one JSON document per record. No retries and no client-side timeout:
/// the request either completes or the transport gives up.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: Client,
    endpoint: Url,
}

impl SheetsClient {
    pub fn new(endpoint: &str) -> Result<Self, SubmissionError> {
        let endpoint = Url::parse(endpoint.trim())
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or_else(|| SubmissionError::InvalidEndpoint {
                url: endpoint.to_string(),
            })?;
        let http = Client::builder().build()?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends the record, surfacing the reason when it does not land.
    pub async fn try_submit(&self, record: &PropertyRecord) -> Result<(), SubmissionError> {
        let payload = SheetPayload::from_record(record, Utc::now());

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmissionError::Status(status));
        }
        Ok(())
    }
}

#[async_trait]
impl SurveySink for SheetsClient {
    async fn submit(&self, record: &PropertyRecord) -> SubmissionOutcome {
        match self.try_submit(record).await {
            Ok(()) => {
                info!(
                    property_type = ?record.property_type,
                    photos = record.photos.len(),
                    "survey row delivered to spreadsheet"
                );
                SubmissionOutcome::Success
            }
            Err(err) => {
                warn!(error = %err, "survey submission failed");
                SubmissionOutcome::Failure
            }
        }
    }
}
