use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use super::payload::SheetPayload;
use super::{SubmissionOutcome, SurveySink};
use crate::survey::domain::PropertyRecord;

/// Stand-in for the spreadsheet when no endpoint is configured. Builds the
/// same payload, waits as long as a real round-trip typically takes, and
/// always reports success.
#[derive(Debug, Clone)]
pub struct SimulatedSheetSink {
    delay: Duration,
}

impl SimulatedSheetSink {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedSheetSink {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}

#[async_trait]
impl SurveySink for SimulatedSheetSink {
    async fn submit(&self, record: &PropertyRecord) -> SubmissionOutcome {
        let payload = SheetPayload::from_record(record, Utc::now());
        info!(
            property_type = ?record.property_type,
            columns = payload.len(),
            "simulating spreadsheet submission"
        );
        tokio::time::sleep(self.delay).await;
        SubmissionOutcome::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::domain::PropertyType;

    #[tokio::test]
    async fn simulated_sink_always_succeeds() {
        let sink = SimulatedSheetSink::new(Duration::ZERO);
        let record = PropertyRecord::new(PropertyType::Commercial);
        assert_eq!(sink.submit(&record).await, SubmissionOutcome::Success);
    }
}
