use crate::infra::{AppState, LocationReport, PhotoUpload, ReportedPosition, SurveyState, UploadedPhotos};
use crate::views::{Component, SurveyPage};
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::{Extension, Form, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use survey_form::error::AppError;
use survey_form::survey::{
    ChoiceOption, FieldKind, FormController, FormError, FormStatus, Notice, PropertyType,
    SubmissionOutcome, MAX_PHOTOS,
};
use tracing::{info, warn};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    #[serde(default)]
    pub(crate) tab: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TypeChange {
    pub(crate) property_type: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FieldUpdate {
    pub(crate) field: String,
    #[serde(default)]
    pub(crate) value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PhotoBatch {
    #[serde(default)]
    pub(crate) photos: Vec<PhotoUpload>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NoticeView {
    pub(crate) kind: &'static str,
    pub(crate) message: String,
    pub(crate) is_error: bool,
}

impl From<&Notice> for NoticeView {
    fn from(notice: &Notice) -> Self {
        Self {
            kind: notice.kind(),
            message: notice.message(),
            is_error: notice.is_error(),
        }
    }
}

/// JSON rendering of the form for API clients.
#[derive(Debug, Serialize)]
pub(crate) struct SurveyView {
    pub(crate) property_type: &'static str,
    pub(crate) property_type_label: &'static str,
    pub(crate) status: FormStatus,
    pub(crate) visible_fields: Vec<&'static str>,
    pub(crate) record: Map<String, Value>,
    pub(crate) photo_limit: usize,
    pub(crate) notice: Option<NoticeView>,
}

impl From<&FormController> for SurveyView {
    fn from(controller: &FormController) -> Self {
        let active = controller.active_type();
        let record = controller.record();
        let visible = controller.visible_fields();

        let mut fields = Map::new();
        for field in visible.iter() {
            let value = match field.kind() {
                FieldKind::Text => Value::from(record.text(field).unwrap_or_default()),
                FieldKind::Choice => match record.choice(field) {
                    Some((key, label)) => json!({ "key": key, "label": label }),
                    None => Value::Null,
                },
                FieldKind::Location => match record.location {
                    Some(fix) => json!({ "latitude": fix.latitude, "longitude": fix.longitude }),
                    None => Value::Null,
                },
                FieldKind::Photos => Value::Array(
                    record
                        .photos
                        .iter()
                        .map(|photo| {
                            json!({
                                "name": photo.name,
                                "content_type": photo.content_type,
                                "size": photo.size(),
                            })
                        })
                        .collect(),
                ),
            };
            fields.insert(field.key().to_string(), value);
        }

        Self {
            property_type: active.key(),
            property_type_label: active.label(),
            status: controller.status(),
            visible_fields: visible.iter().map(|field| field.key()).collect(),
            record: fields,
            photo_limit: MAX_PHOTOS,
            notice: controller.notice().map(NoticeView::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitResponse {
    pub(crate) outcome: SubmissionOutcome,
    pub(crate) survey: SurveyView,
}

/// Form page plus the JSON API, sharing one survey session.
pub(crate) fn survey_router(state: SurveyState) -> Router {
    let photo_upload_limit = state.photo_upload_limit;
    Router::new()
        .route("/", get(form_page))
        .route("/form", post(form_submit))
        .route("/form/type", post(form_switch_type))
        .route("/api/v1/survey", get(survey_endpoint))
        .route("/api/v1/survey/type", post(type_endpoint))
        .route("/api/v1/survey/fields", post(fields_endpoint))
        .route("/api/v1/survey/location", post(location_endpoint))
        .route(
            "/api/v1/survey/photos",
            post(photos_endpoint).layer(DefaultBodyLimit::max(photo_upload_limit)),
        )
        .route("/api/v1/survey/submit", post(submit_endpoint))
        .route("/api/v1/survey/reset", post(reset_endpoint))
        .with_state(state)
}

pub(crate) fn with_survey_routes(state: SurveyState) -> Router {
    survey_router(state)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn parse_type(raw: &str) -> Result<PropertyType, AppError> {
    raw.parse::<PropertyType>()
        .map_err(|err| AppError::from(FormError::from(err)))
}

fn view(state: &SurveyState) -> Json<SurveyView> {
    Json(state.session.with(|controller| SurveyView::from(&*controller)))
}

pub(crate) async fn form_page(
    State(state): State<SurveyState>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let html = state.session.with(|controller| -> Result<String, AppError> {
        if let Some(tab) = query.tab.as_deref() {
            let tab = parse_type(tab)?;
            if tab != controller.active_type() {
                controller.select_type(tab)?;
            }
        }
        // The page shows a notice once; the JSON view keeps it.
        let notice = controller.take_notice();
        Ok(SurveyPage {
            controller,
            notice: notice.as_ref(),
        }
        .render())
    })?;
    Ok(Html(html))
}

/// Applies a posted form to a copy of the controller and swaps it in only if
/// every value is accepted. Unchecked radios and missing inputs clear the
/// field, as the posted form is the whole screen.
fn apply_posted(
    controller: &mut FormController,
    values: &HashMap<String, String>,
) -> Result<(), FormError> {
    let mut staged = controller.clone();
    if let Some(tab) = values.get("type") {
        let tab = tab.parse::<PropertyType>()?;
        if tab != staged.active_type() {
            staged.select_type(tab)?;
        }
    }
    for field in staged.visible_fields().iter() {
        if !matches!(field.kind(), FieldKind::Text | FieldKind::Choice) {
            continue;
        }
        let value = values.get(field.key()).map(String::as_str).unwrap_or("");
        staged.set_field(field.key(), value)?;
    }
    *controller = staged;
    Ok(())
}

/// Browsers get the page back with a notice, never a JSON error body.
fn back_to_page(state: &SurveyState, err: FormError) -> Redirect {
    warn!(error = %err, "form post rejected");
    state
        .session
        .with(|controller| controller.report_rejection(&err));
    Redirect::to("/")
}

pub(crate) async fn form_submit(
    State(state): State<SurveyState>,
    Form(values): Form<HashMap<String, String>>,
) -> Redirect {
    if let Err(err) = state
        .session
        .with(|controller| apply_posted(controller, &values))
    {
        return back_to_page(&state, err);
    }

    match state.session.submit(state.sink.as_ref()).await {
        Ok(outcome) => {
            info!(?outcome, "form page submission settled");
            Redirect::to("/")
        }
        Err(err) => back_to_page(&state, err),
    }
}

/// Tab buttons post the current screen here: the typed values are kept and
/// the requested tab becomes active, without submitting.
pub(crate) async fn form_switch_type(
    State(state): State<SurveyState>,
    Form(values): Form<HashMap<String, String>>,
) -> Redirect {
    let switched = state.session.with(|controller| -> Result<(), FormError> {
        let target = values
            .get("switch_to")
            .map(String::as_str)
            .unwrap_or_default()
            .parse::<PropertyType>()?;
        apply_posted(controller, &values)?;
        controller.select_type(target)
    });
    match switched {
        Ok(()) => Redirect::to("/"),
        Err(err) => back_to_page(&state, err),
    }
}

pub(crate) async fn survey_endpoint(State(state): State<SurveyState>) -> Json<SurveyView> {
    view(&state)
}

pub(crate) async fn type_endpoint(
    State(state): State<SurveyState>,
    Json(change): Json<TypeChange>,
) -> Result<Json<SurveyView>, AppError> {
    let property_type = parse_type(&change.property_type)?;
    state
        .session
        .with(|controller| controller.select_type(property_type))?;
    Ok(view(&state))
}

pub(crate) async fn fields_endpoint(
    State(state): State<SurveyState>,
    Json(update): Json<FieldUpdate>,
) -> Result<Json<SurveyView>, AppError> {
    state
        .session
        .with(|controller| controller.set_field(&update.field, &update.value))?;
    Ok(view(&state))
}

pub(crate) async fn location_endpoint(
    State(state): State<SurveyState>,
    Json(report): Json<LocationReport>,
) -> Result<Json<SurveyView>, AppError> {
    let provider = ReportedPosition::from(report);
    state.session.capture_location(&provider).await?;
    Ok(view(&state))
}

pub(crate) async fn photos_endpoint(
    State(state): State<SurveyState>,
    Json(batch): Json<PhotoBatch>,
) -> Result<Json<SurveyView>, AppError> {
    let source = UploadedPhotos::new(batch.photos);
    state.session.capture_photos(&source).await?;
    Ok(view(&state))
}

pub(crate) async fn submit_endpoint(
    State(state): State<SurveyState>,
) -> Result<Json<SubmitResponse>, AppError> {
    let outcome = state.session.submit(state.sink.as_ref()).await?;
    let survey = state
        .session
        .with(|controller| SurveyView::from(&*controller));
    Ok(Json(SubmitResponse { outcome, survey }))
}

pub(crate) async fn reset_endpoint(
    State(state): State<SurveyState>,
) -> Result<Json<SurveyView>, AppError> {
    state.session.with(|controller| controller.reset())?;
    Ok(view(&state))
}
