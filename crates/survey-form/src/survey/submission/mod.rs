//! Hands a finished record to the spreadsheet that collects survey rows.
//!
//! One request per record and a pass/fail outcome. No retries. Shaping rows
//! for the sheet is the receiving script's job.

mod payload;
mod sheets;
mod simulated;

use async_trait::async_trait;
use serde::Serialize;

use super::domain::PropertyRecord;
use crate::config::SubmissionConfig;

pub use payload::{PhotoAttachment, SheetPayload};
pub use sheets::{SheetsClient, SubmissionError};
pub use simulated::SimulatedSheetSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Success,
    Failure,
}

impl SubmissionOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<bool> for SubmissionOutcome {
    fn from(value: bool) -> Self {
        if value {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

/// Destination for submitted survey records.
///
/// Implementations swallow their own transport errors: the caller only learns
/// whether the row landed.
#[async_trait]
pub trait SurveySink: Send + Sync {
    async fn submit(&self, record: &PropertyRecord) -> SubmissionOutcome;
}

/// Builds the sink described by the configuration: the HTTP client when an
/// endpoint is configured, otherwise the simulated sheet.
pub fn sink_from_config(config: &SubmissionConfig) -> Result<Box<dyn SurveySink>, SubmissionError> {
    match config.endpoint_url.as_deref() {
        Some(url) => Ok(Box::new(SheetsClient::new(url)?)),
        None => {
            tracing::warn!(
                "SURVEY_ENDPOINT_URL not set; submissions go to the simulated spreadsheet"
            );
            Ok(Box::new(SimulatedSheetSink::new(config.simulated_delay)))
        }
    }
}
