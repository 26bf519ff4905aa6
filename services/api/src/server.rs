use crate::cli::ServeArgs;
use crate::infra::{AppState, SurveyState};
use crate::routes::with_survey_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use survey_form::config::AppConfig;
use survey_form::error::AppError;
use survey_form::survey::{sink_from_config, SurveySession, SurveySink};
use survey_form::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let sink: Arc<dyn SurveySink> = Arc::from(sink_from_config(&config.submission)?);
    let survey_state = SurveyState {
        session: Arc::new(SurveySession::new(config.form.default_type)),
        sink,
        photo_upload_limit: config.form.photo_upload_limit,
    };

    let app = with_survey_routes(survey_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        default_type = %config.form.default_type,
        "property survey form ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
