use serde::Serialize;
use tracing::{debug, info, warn};

use super::device::LocationError;
use super::domain::{Coordinates, FieldId, FieldKind, PropertyRecord, PropertyType, UnknownPropertyType};
use super::photos::{Photo, MAX_PHOTOS};
use super::submission::SubmissionOutcome;
use super::validation::{validate, ValidationError};
use super::visibility::{visible_fields, FieldSet};

/// What the form is waiting on. Only one asynchronous operation may be in
/// flight at a time; anything else is refused, never queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    Idle,
    Submitting,
    LocationCapturing,
}

impl FormStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::LocationCapturing => "capturing location",
        }
    }
}

/// Feedback shown to the field agent after an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    ValidationFailed { missing: Vec<FieldId> },
    Submitted,
    SubmissionFailed,
    LocationUnsupported,
    LocationFailed(LocationError),
    LocationCaptured(Coordinates),
    PhotosTruncated { dropped: usize },
    PhotosUnavailable,
    Busy(FormStatus),
    InputRejected,
}

impl Notice {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ValidationFailed { .. } => "validation_failed",
            Self::Submitted => "submitted",
            Self::SubmissionFailed => "submission_failed",
            Self::LocationUnsupported => "location_unsupported",
            Self::LocationFailed(_) => "location_failed",
            Self::LocationCaptured(_) => "location_captured",
            Self::PhotosTruncated { .. } => "photos_truncated",
            Self::PhotosUnavailable => "photos_unavailable",
            Self::Busy(_) => "busy",
            Self::InputRejected => "input_rejected",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::ValidationFailed { .. } => {
                "Por favor, preencha pelo menos o Preço e o Informante.".to_string()
            }
            Self::Submitted => "Dados enviados com sucesso para a planilha!".to_string(),
            Self::SubmissionFailed => "Erro ao enviar. Tente novamente.".to_string(),
            Self::LocationUnsupported => {
                "Geolocalização não é suportada pelo seu navegador.".to_string()
            }
            Self::LocationFailed(_) => {
                "Erro ao obter localização. Verifique as permissões.".to_string()
            }
            Self::LocationCaptured(coords) => format!(
                "Localização capturada: {:.6}, {:.6}",
                coords.latitude, coords.longitude
            ),
            Self::PhotosTruncated { dropped } => format!(
                "Limite de {MAX_PHOTOS} fotos atingido; {dropped} foto(s) ignorada(s)."
            ),
            Self::PhotosUnavailable => "Não foi possível carregar as fotos.".to_string(),
            Self::Busy(FormStatus::LocationCapturing) => {
                "Aguarde a captura da localização terminar.".to_string()
            }
            Self::Busy(_) => "Aguarde o envio em andamento terminar.".to_string(),
            Self::InputRejected => {
                "Valor inválido no formulário. Nada foi alterado; revise os campos.".to_string()
            }
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Submitted | Self::LocationCaptured(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("form is busy ({})", .0.label())]
    Busy(FormStatus),
    #[error("no {} in progress", .0.label())]
    NotInProgress(FormStatus),
    #[error("'{value}' is not an option for {field}")]
    InvalidChoice { field: FieldId, value: String },
    #[error("{0} is not a text field")]
    NotATextField(FieldId),
    #[error("{0} is not a single-select field")]
    NotAChoiceField(FieldId),
    #[error("{0} cannot be set from text")]
    NotEditableAsText(FieldId),
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error(transparent)]
    UnknownPropertyType(#[from] UnknownPropertyType),
    #[error(transparent)]
    PhotoSource(#[from] super::device::PhotoSourceError),
}

/// Owns the record being filled and the form's single in-flight operation.
///
/// Asynchronous work is split into `begin_*`/`complete_*` pairs so callers can
/// await devices and the network without holding the controller; see
/// [`super::session::SurveySession`].
#[derive(Debug, Clone)]
pub struct FormController {
    record: PropertyRecord,
    status: FormStatus,
    notice: Option<Notice>,
}

impl FormController {
    pub fn new(property_type: PropertyType) -> Self {
        Self {
            record: PropertyRecord::new(property_type),
            status: FormStatus::Idle,
            notice: None,
        }
    }

    pub fn record(&self) -> &PropertyRecord {
        &self.record
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    pub fn active_type(&self) -> PropertyType {
        self.record.property_type
    }

    pub fn visible_fields(&self) -> FieldSet {
        visible_fields(self.record.property_type)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub(crate) fn ensure_editable(&self) -> Result<(), FormError> {
        if self.status == FormStatus::Submitting {
            return Err(FormError::Busy(self.status));
        }
        Ok(())
    }

    /// Switches tab. Values of fields the new type hides stay in the record
    /// (switching back restores them) but are never submitted.
    pub fn select_type(&mut self, property_type: PropertyType) -> Result<(), FormError> {
        self.ensure_editable()?;
        if self.record.property_type != property_type {
            debug!(from = ?self.record.property_type, to = ?property_type, "property type changed");
        }
        self.record.property_type = property_type;
        Ok(())
    }

    pub fn set_text(&mut self, field: FieldId, value: impl Into<String>) -> Result<(), FormError> {
        self.ensure_editable()?;
        let slot = self
            .record
            .text_mut(field)
            .ok_or(FormError::NotATextField(field))?;
        *slot = value.into();
        Ok(())
    }

    /// Sets a single-select field from an option key or label. An empty value
    /// clears the field.
    pub fn set_choice(&mut self, field: FieldId, value: &str) -> Result<(), FormError> {
        self.ensure_editable()?;
        if field.kind() != FieldKind::Choice {
            return Err(FormError::NotAChoiceField(field));
        }
        if self.record.apply_choice(field, value) {
            Ok(())
        } else {
            Err(FormError::InvalidChoice {
                field,
                value: value.to_string(),
            })
        }
    }

    /// Dispatches a raw `key = value` edit from a form post or API call.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<FieldId, FormError> {
        let field = FieldId::from_key(key).ok_or_else(|| FormError::UnknownField(key.to_string()))?;
        match field.kind() {
            FieldKind::Text => self.set_text(field, value)?,
            FieldKind::Choice => self.set_choice(field, value)?,
            FieldKind::Location | FieldKind::Photos => {
                return Err(FormError::NotEditableAsText(field))
            }
        }
        Ok(field)
    }

    pub fn clear_field(&mut self, field: FieldId) -> Result<(), FormError> {
        self.ensure_editable()?;
        self.record.clear(field);
        Ok(())
    }

    /// Typed in-place edit of the record. The property type is owned by the
    /// tab selector, so edits to it are ignored here; use [`Self::select_type`].
    pub fn edit<F>(&mut self, apply: F) -> Result<(), FormError>
    where
        F: FnOnce(&mut PropertyRecord),
    {
        self.ensure_editable()?;
        let property_type = self.record.property_type;
        apply(&mut self.record);
        self.record.property_type = property_type;
        Ok(())
    }

    /// Appends photos, keeping only the first [`MAX_PHOTOS`]. Returns how many
    /// of the offered photos were kept.
    pub fn add_photos<I>(&mut self, photos: I) -> Result<usize, FormError>
    where
        I: IntoIterator<Item = Photo>,
    {
        self.ensure_editable()?;
        let offered: Vec<Photo> = photos.into_iter().collect();
        let total = offered.len();
        let accepted = self.record.photos.extend(offered);
        let dropped = total - accepted;
        if dropped > 0 {
            debug!(accepted, dropped, "photo album full; extra photos dropped");
            self.notice = Some(Notice::PhotosTruncated { dropped });
        }
        Ok(accepted)
    }

    /// Discards everything except the active property type.
    pub fn reset(&mut self) -> Result<(), FormError> {
        self.ensure_editable()?;
        self.record = PropertyRecord::new(self.record.property_type);
        Ok(())
    }

    /// Validates and enters `Submitting`, returning what should be sent: the
    /// record with fields hidden for its type blanked out.
    pub fn begin_submit(&mut self) -> Result<PropertyRecord, FormError> {
        if self.status != FormStatus::Idle {
            debug!(status = ?self.status, "submit refused while busy");
            return Err(FormError::Busy(self.status));
        }
        if let Err(err) = validate(&self.record) {
            self.notice = Some(Notice::ValidationFailed {
                missing: err.missing.clone(),
            });
            return Err(err.into());
        }

        self.status = FormStatus::Submitting;
        self.notice = None;
        Ok(self.record.visible_projection())
    }

    /// Back to `Idle`. A success replaces the record by a fresh one on the
    /// same tab; a failure keeps every entered value for a manual retry.
    pub fn complete_submit(&mut self, outcome: SubmissionOutcome) -> Result<(), FormError> {
        if self.status != FormStatus::Submitting {
            return Err(FormError::NotInProgress(FormStatus::Submitting));
        }
        self.status = FormStatus::Idle;

        match outcome {
            SubmissionOutcome::Success => {
                info!(property_type = ?self.record.property_type, "survey submitted");
                self.record = PropertyRecord::new(self.record.property_type);
                self.notice = Some(Notice::Submitted);
            }
            SubmissionOutcome::Failure => {
                warn!(property_type = ?self.record.property_type, "survey submission failed; record kept");
                self.notice = Some(Notice::SubmissionFailed);
            }
        }
        Ok(())
    }

    pub fn begin_location_capture(&mut self) -> Result<(), FormError> {
        if self.status != FormStatus::Idle {
            return Err(FormError::Busy(self.status));
        }
        self.status = FormStatus::LocationCapturing;
        Ok(())
    }

    /// Applies the device's answer. Failures leave any previous fix untouched.
    pub fn complete_location_capture(
        &mut self,
        result: Result<Coordinates, LocationError>,
    ) -> Result<(), FormError> {
        if self.status != FormStatus::LocationCapturing {
            return Err(FormError::NotInProgress(FormStatus::LocationCapturing));
        }
        self.status = FormStatus::Idle;

        match result {
            Ok(coords) => {
                debug!(latitude = coords.latitude, longitude = coords.longitude, "location captured");
                self.record.location = Some(coords);
                self.notice = Some(Notice::LocationCaptured(coords));
            }
            Err(err) => {
                warn!(error = %err, "location capture failed");
                self.notice = Some(Notice::LocationFailed(err));
            }
        }
        Ok(())
    }

    /// The device has no geolocation; nothing is requested.
    pub fn location_unsupported(&mut self) {
        self.notice = Some(Notice::LocationUnsupported);
    }

    pub(crate) fn photos_unavailable(&mut self) {
        self.notice = Some(Notice::PhotosUnavailable);
    }

    /// Surfaces a refused edit or submission as a notice, for callers that
    /// cannot return the error itself (a browser form post).
    pub fn report_rejection(&mut self, err: &FormError) {
        self.notice = Some(match err {
            FormError::Validation(err) => Notice::ValidationFailed {
                missing: err.missing.clone(),
            },
            FormError::Busy(status) | FormError::NotInProgress(status) => Notice::Busy(*status),
            _ => Notice::InputRejected,
        });
    }
}

impl Default for FormController {
    fn default() -> Self {
        Self::new(PropertyType::default())
    }
}
