use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use survey_form::survey::{
    Coordinates, LocationError, LocationProvider, Photo, PhotoSource, PhotoSourceError,
    PositionOptions, SurveySession, SurveySink,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Router state for the form endpoints.
#[derive(Clone)]
pub(crate) struct SurveyState {
    pub(crate) session: Arc<SurveySession>,
    pub(crate) sink: Arc<dyn SurveySink>,
    /// Body limit, in bytes, for the photo upload route.
    pub(crate) photo_upload_limit: usize,
}

/// Result of a browser geolocation call, relayed by the page.
///
/// Either both coordinates or an `error` code (`permission_denied`,
/// `unavailable`, `timeout`, `unsupported`, or the numeric browser codes).
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct LocationReport {
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

/// Answers a single position request with what the browser already reported.
#[derive(Debug, Clone)]
pub(crate) struct ReportedPosition {
    result: Result<Coordinates, LocationError>,
}

impl ReportedPosition {
    pub(crate) fn fixed(coordinates: Coordinates) -> Self {
        Self {
            result: Ok(coordinates),
        }
    }
}

impl From<LocationReport> for ReportedPosition {
    fn from(report: LocationReport) -> Self {
        let result = match (report.error, report.latitude, report.longitude) {
            (Some(code), _, _) => Err(LocationError::from_code(&code)),
            (None, Some(latitude), Some(longitude)) => Ok(Coordinates::new(latitude, longitude)),
            (None, _, _) => Err(LocationError::Unavailable(
                "position report without coordinates".to_string(),
            )),
        };
        Self { result }
    }
}

#[async_trait]
impl LocationProvider for ReportedPosition {
    fn is_supported(&self) -> bool {
        !matches!(self.result, Err(LocationError::Unsupported))
    }

    async fn current_position(
        &self,
        _options: PositionOptions,
    ) -> Result<Coordinates, LocationError> {
        self.result.clone()
    }
}

/// One picked file as posted by the page. `data` is base64, optionally as a
/// `data:` URL straight from `FileReader.readAsDataURL`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PhotoUpload {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) content_type: Option<String>,
    pub(crate) data: String,
}

impl PhotoUpload {
    fn decode(self) -> Result<Photo, PhotoSourceError> {
        let (embedded_type, encoded) = split_data_url(&self.data);
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|err| PhotoSourceError::Unreadable(format!("{}: {err}", self.name)))?;

        let content_type = self
            .content_type
            .filter(|value| !value.trim().is_empty())
            .or(embedded_type)
            .unwrap_or_else(|| {
                mime_guess::from_path(&self.name)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });

        Ok(Photo::new(self.name, content_type, bytes))
    }
}

fn split_data_url(raw: &str) -> (Option<String>, &str) {
    let Some(rest) = raw.strip_prefix("data:") else {
        return (None, raw);
    };
    match rest.split_once(";base64,") {
        Some((media_type, payload)) if !media_type.is_empty() => {
            (Some(media_type.to_string()), payload)
        }
        Some((_, payload)) => (None, payload),
        None => (None, raw),
    }
}

/// Hands over the photos that arrived with the request, in order.
#[derive(Debug, Clone, Default)]
pub(crate) struct UploadedPhotos {
    uploads: Vec<PhotoUpload>,
}

impl UploadedPhotos {
    pub(crate) fn new(uploads: Vec<PhotoUpload>) -> Self {
        Self { uploads }
    }
}

#[async_trait]
impl PhotoSource for UploadedPhotos {
    async fn pick(&self) -> Result<Vec<Photo>, PhotoSourceError> {
        self.uploads.iter().cloned().map(PhotoUpload::decode).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reported_error_codes_map_to_location_errors() {
        let denied = ReportedPosition::from(LocationReport {
            error: Some("1".to_string()),
            ..LocationReport::default()
        });
        assert!(denied.is_supported());
        assert_eq!(
            denied.current_position(PositionOptions::default()).await,
            Err(LocationError::PermissionDenied)
        );

        let unsupported = ReportedPosition::from(LocationReport {
            error: Some("unsupported".to_string()),
            ..LocationReport::default()
        });
        assert!(!unsupported.is_supported());

        let partial = ReportedPosition::from(LocationReport {
            latitude: Some(-7.85),
            ..LocationReport::default()
        });
        assert!(matches!(
            partial.current_position(PositionOptions::default()).await,
            Err(LocationError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn uploads_decode_plain_and_data_url_payloads() {
        let source = UploadedPhotos::new(vec![
            PhotoUpload {
                name: "fachada.png".to_string(),
                content_type: None,
                data: "anBlZw==".to_string(),
            },
            PhotoUpload {
                name: "blob".to_string(),
                content_type: None,
                data: "data:image/webp;base64,anBlZw==".to_string(),
            },
        ]);

        let photos = source.pick().await.expect("valid uploads");

        assert_eq!(photos[0].content_type, "image/png");
        assert_eq!(photos[0].bytes, b"jpeg".to_vec());
        assert_eq!(photos[1].content_type, "image/webp");
    }

    #[tokio::test]
    async fn undecodable_upload_is_unreadable() {
        let source = UploadedPhotos::new(vec![PhotoUpload {
            name: "broken.jpg".to_string(),
            content_type: Some("image/jpeg".to_string()),
            data: "not base64!".to_string(),
        }]);

        assert!(matches!(
            source.pick().await,
            Err(PhotoSourceError::Unreadable(reason)) if reason.starts_with("broken.jpg")
        ));
    }
}
