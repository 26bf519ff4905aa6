use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::{oneshot, Notify};

use crate::survey::device::{
    LocationError, LocationProvider, PhotoSource, PhotoSourceError, PositionOptions,
};
use crate::survey::domain::{Coordinates, PropertyRecord, PropertyType};
use crate::survey::photos::Photo;
use crate::survey::submission::{SubmissionOutcome, SurveySink};

pub(super) fn photo(name: &str) -> Photo {
    Photo::jpeg(name, name.as_bytes().to_vec())
}

pub(super) fn filled_record(property_type: PropertyType) -> PropertyRecord {
    let mut record = PropertyRecord::new(property_type);
    record.price = "350000".to_string();
    record.informant_name = "Maria".to_string();
    record
}

/// Sink answering with a fixed outcome and remembering every record it saw.
pub(super) struct RecordingSink {
    outcome: SubmissionOutcome,
    received: Mutex<Vec<PropertyRecord>>,
}

impl RecordingSink {
    pub(super) fn new(outcome: SubmissionOutcome) -> Self {
        Self {
            outcome,
            received: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn received(&self) -> Vec<PropertyRecord> {
        self.received.lock().expect("sink mutex").clone()
    }
}

#[async_trait]
impl SurveySink for RecordingSink {
    async fn submit(&self, record: &PropertyRecord) -> SubmissionOutcome {
        self.received.lock().expect("sink mutex").push(record.clone());
        self.outcome
    }
}

/// Sink that holds every call open until released, so tests can act while a
/// submission is in flight.
pub(super) struct GatedSink {
    calls: AtomicUsize,
    entered: Notify,
    release: Mutex<Option<oneshot::Receiver<SubmissionOutcome>>>,
}

impl GatedSink {
    pub(super) fn new() -> (Self, oneshot::Sender<SubmissionOutcome>) {
        let (tx, rx) = oneshot::channel();
        let sink = Self {
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            release: Mutex::new(Some(rx)),
        };
        (sink, tx)
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) async fn wait_until_entered(&self) {
        self.entered.notified().await;
    }
}

#[async_trait]
impl SurveySink for GatedSink {
    async fn submit(&self, _record: &PropertyRecord) -> SubmissionOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        let release = self.release.lock().expect("gate mutex").take();
        match release {
            Some(rx) => rx.await.unwrap_or(SubmissionOutcome::Failure),
            None => SubmissionOutcome::Failure,
        }
    }
}

/// Geolocation stub answering every request the same way.
pub(super) struct FixedLocation {
    pub(super) supported: bool,
    pub(super) result: Result<Coordinates, LocationError>,
    pub(super) requests: Mutex<Vec<PositionOptions>>,
}

impl FixedLocation {
    pub(super) fn answering(result: Result<Coordinates, LocationError>) -> Self {
        Self {
            supported: true,
            result,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn unsupported() -> Self {
        Self {
            supported: false,
            result: Err(LocationError::Unsupported),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn request_count(&self) -> usize {
        self.requests.lock().expect("location mutex").len()
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn current_position(
        &self,
        options: PositionOptions,
    ) -> Result<Coordinates, LocationError> {
        self.requests.lock().expect("location mutex").push(options);
        self.result.clone()
    }
}

/// Picker returning a prepared batch.
pub(super) struct FakePicker {
    pub(super) batch: Result<Vec<Photo>, PhotoSourceError>,
}

#[async_trait]
impl PhotoSource for FakePicker {
    async fn pick(&self) -> Result<Vec<Photo>, PhotoSourceError> {
        self.batch.clone()
    }
}

/// Geolocation that never answers, standing in for a request the client
/// abandons.
#[derive(Default)]
pub(super) struct StalledLocation {
    entered: Notify,
}

impl StalledLocation {
    pub(super) async fn wait_until_entered(&self) {
        self.entered.notified().await;
    }
}

#[async_trait]
impl LocationProvider for StalledLocation {
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(
        &self,
        _options: PositionOptions,
    ) -> Result<Coordinates, LocationError> {
        self.entered.notify_one();
        std::future::pending().await
    }
}
