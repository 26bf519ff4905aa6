//! Property survey form: record model, per-type field rules, validation, and
//! the controller that drives capture and submission.

pub mod controller;
pub mod device;
pub mod domain;
pub mod photos;
pub mod session;
pub mod submission;
pub mod validation;
pub mod visibility;

#[cfg(test)]
mod tests;

pub use controller::{FormController, FormError, FormStatus, Notice};
pub use device::{
    LocationError, LocationProvider, PhotoSource, PhotoSourceError, PositionOptions,
};
pub use domain::{
    BlockPosition, ChoiceOption, Coordinates, CoverageType, FieldId, FieldKind, Floors, Pavement,
    PropertyRecord, PropertyType, Topography, UnknownPropertyType, YesNo,
};
pub use photos::{Photo, PhotoAlbum, MAX_PHOTOS};
pub use session::SurveySession;
pub use submission::{
    sink_from_config, SheetPayload, SheetsClient, SimulatedSheetSink, SubmissionError,
    SubmissionOutcome, SurveySink,
};
pub use validation::{validate, ValidationError, REQUIRED_FIELDS};
pub use visibility::{is_visible, visible_fields, FieldSet};
