use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::controller::{FormController, FormError, FormStatus};
use super::device::{LocationError, LocationProvider, PhotoSource, PositionOptions};
use super::domain::{Coordinates, PropertyType};
use super::submission::{SubmissionOutcome, SurveySink};

/// A form controller shared between tasks.
///
/// The lock is only ever held for synchronous state changes; device and
/// network calls are awaited with it released, and the controller's status
/// gate refuses a second operation while one is in flight.
#[derive(Debug, Default)]
pub struct SurveySession {
    controller: Mutex<FormController>,
}

impl SurveySession {
    pub fn new(property_type: PropertyType) -> Self {
        Self::from_controller(FormController::new(property_type))
    }

    pub fn from_controller(controller: FormController) -> Self {
        Self {
            controller: Mutex::new(controller),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormController> {
        self.controller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs a synchronous action against the controller.
    pub fn with<R>(&self, action: impl FnOnce(&mut FormController) -> R) -> R {
        let mut guard = self.lock();
        action(&mut guard)
    }

    /// Copy of the current controller state.
    pub fn snapshot(&self) -> FormController {
        self.lock().clone()
    }

    /// Validates, sends the visible projection of the record, and settles the
    /// outcome. While a submission is in flight further calls fail with
    /// [`FormError::Busy`] without reaching the sink.
    pub async fn submit(&self, sink: &dyn SurveySink) -> Result<SubmissionOutcome, FormError> {
        let outgoing = self.with(|controller| controller.begin_submit())?;
        debug!(property_type = ?outgoing.property_type, "submission in flight");
        let in_flight = InFlight::new(self, FormStatus::Submitting);

        let outcome = sink.submit(&outgoing).await;

        in_flight.disarm();
        self.with(|controller| controller.complete_submit(outcome))?;
        Ok(outcome)
    }

    /// One-shot high-accuracy position request. Returns the new fix, or `None`
    /// when the device could not provide one (a notice explains why).
    pub async fn capture_location(
        &self,
        provider: &dyn LocationProvider,
    ) -> Result<Option<Coordinates>, FormError> {
        if !provider.is_supported() {
            self.with(|controller| controller.location_unsupported());
            return Ok(None);
        }

        self.with(|controller| controller.begin_location_capture())?;
        let in_flight = InFlight::new(self, FormStatus::LocationCapturing);
        let result = provider.current_position(PositionOptions::default()).await;
        in_flight.disarm();
        let fix = result.as_ref().ok().copied();
        self.with(|controller| controller.complete_location_capture(result))?;
        Ok(fix)
    }

    /// Opens the picker and appends what it returns. Returns how many photos
    /// were kept.
    pub async fn capture_photos(&self, source: &dyn PhotoSource) -> Result<usize, FormError> {
        self.with(|controller| controller.ensure_editable())?;

        match source.pick().await {
            Ok(photos) => self.with(|controller| controller.add_photos(photos)),
            Err(err) => {
                self.with(|controller| controller.photos_unavailable());
                Err(err.into())
            }
        }
    }
}

/// Settles an operation whose future was dropped before the device or sink
/// answered, e.g. when the client disconnects mid-request. A cancelled
/// submission counts as a failure and keeps the record; a cancelled capture
/// keeps any earlier fix.
struct InFlight<'a> {
    session: &'a SurveySession,
    operation: FormStatus,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(session: &'a SurveySession, operation: FormStatus) -> Self {
        Self {
            session,
            operation,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!(operation = self.operation.label(), "in-flight operation cancelled");
        let operation = self.operation;
        let settled = self.session.with(|controller| match operation {
            FormStatus::Submitting => controller.complete_submit(SubmissionOutcome::Failure),
            FormStatus::LocationCapturing => controller.complete_location_capture(Err(
                LocationError::Unavailable("request cancelled".to_string()),
            )),
            FormStatus::Idle => Ok(()),
        });
        if let Err(err) = settled {
            debug!(error = %err, "cancelled operation already settled");
        }
    }
}
