use crate::infra::ReportedPosition;
use chrono::Utc;
use clap::Args;
use survey_form::config::AppConfig;
use survey_form::error::AppError;
use survey_form::survey::{
    is_visible, sink_from_config, ChoiceOption, Coordinates, FieldId, FieldKind, FormController,
    FormError, Photo, PropertyType, SheetPayload, SurveySession,
};

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Property type tab to fill (land, house, condo_apartment, commercial or the tab label)
    #[arg(long, default_value = "land")]
    pub(crate) property_type: PropertyType,
    /// Asking price as the agent would type it
    #[arg(long, default_value = "350.000,00")]
    pub(crate) price: String,
    /// Name of the person who gave the information
    #[arg(long, default_value = "Maria")]
    pub(crate) informant: String,
    /// Number of placeholder photos to attach (only the first three are kept)
    #[arg(long, default_value_t = 0)]
    pub(crate) photos: usize,
    /// GPS fix to record, as "latitude,longitude"
    #[arg(long, value_parser = parse_coordinates, allow_hyphen_values = true)]
    pub(crate) location: Option<Coordinates>,
}

const SAMPLE_ANSWERS: [(FieldId, &str); 11] = [
    (FieldId::LotArea, "300"),
    (FieldId::BuiltArea, "80"),
    (FieldId::Frontage, "10"),
    (FieldId::CondoFee, "500,00"),
    (FieldId::BlockPosition, "corner"),
    (FieldId::Topography, "level"),
    (FieldId::Floors, "ground_floor_only"),
    (FieldId::Pavement, "asphalt"),
    (FieldId::HasPool, "no"),
    (FieldId::IsWalled, "yes"),
    (FieldId::CoverageType, "roof_tile"),
];

pub(crate) fn parse_coordinates(raw: &str) -> Result<Coordinates, String> {
    let (latitude, longitude) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected 'latitude,longitude', got '{raw}'"))?;
    let latitude = latitude
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid latitude '{latitude}' ({err})"))?;
    let longitude = longitude
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid longitude '{longitude}' ({err})"))?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("coordinates out of range: {latitude}, {longitude}"));
    }
    Ok(Coordinates::new(latitude, longitude))
}

fn fill_sample(form: &mut FormController, args: &DemoArgs) -> Result<(), FormError> {
    form.set_text(FieldId::Price, args.price.as_str())?;
    form.set_text(FieldId::InformantName, args.informant.as_str())?;
    form.set_text(FieldId::Phone, "(81) 99999-0000")?;
    for (field, value) in SAMPLE_ANSWERS {
        if is_visible(args.property_type, field) {
            form.set_field(field.key(), value)?;
        }
    }
    form.add_photos((1..=args.photos).map(|n| {
        Photo::jpeg(format!("foto-{n}.jpg"), format!("placeholder photo {n}").into_bytes())
    }))?;
    Ok(())
}

fn print_record(form: &FormController) {
    let record = form.record();
    for field in form.visible_fields().iter() {
        let value = match field.kind() {
            FieldKind::Text => record.text(field).unwrap_or_default().to_string(),
            FieldKind::Choice => record
                .choice(field)
                .map_or_else(|| "-".to_string(), |(_, label)| label.to_string()),
            FieldKind::Location => match record.location {
                Some(fix) => format!("{:.6}, {:.6}", fix.latitude, fix.longitude),
                None => "-".to_string(),
            },
            FieldKind::Photos => format!("{} photo(s)", record.photos.len()),
        };
        println!("  {:<24} {}", field.label(), value);
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let sink = sink_from_config(&config.submission)?;
    let session = SurveySession::new(args.property_type);

    println!("Property survey demo");
    match config.submission.endpoint_url.as_deref() {
        Some(url) => println!("- Spreadsheet endpoint: {url}"),
        None => println!(
            "- Simulated spreadsheet ({} ms delay); set SURVEY_ENDPOINT_URL to post for real",
            config.submission.simulated_delay.as_millis()
        ),
    }

    session.with(|form| fill_sample(form, &args))?;
    if let Some(fix) = args.location {
        session
            .capture_location(&ReportedPosition::fixed(fix))
            .await?;
    }
    if let Some(notice) = session.with(|form| form.take_notice()) {
        println!("- {}", notice.message());
    }

    let snapshot = session.snapshot();
    println!("\n{} tab", args.property_type.label());
    print_record(&snapshot);

    let preview = SheetPayload::from_record(&snapshot.record().visible_projection(), Utc::now());
    let columns = preview
        .into_value()
        .as_object()
        .map(|row| row.keys().cloned().collect::<Vec<String>>().join(", "))
        .unwrap_or_default();
    println!("\nColumns sent: {columns}");

    match session.submit(sink.as_ref()).await {
        Ok(outcome) => println!("Submission outcome: {outcome:?}"),
        Err(FormError::Validation(err)) => println!("Submission blocked: {err}"),
        Err(err) => return Err(err.into()),
    }
    if let Some(notice) = session.with(|form| form.take_notice()) {
        println!("  {}", notice.message());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_parse_and_range_check() {
        let fix = parse_coordinates("-7.850512, -35.254301").expect("valid pair");
        assert_eq!(fix, Coordinates::new(-7.850512, -35.254301));
        assert!(parse_coordinates("-7.85").is_err());
        assert!(parse_coordinates("95,10").is_err());
        assert!(parse_coordinates("north,10").is_err());
    }

    #[test]
    fn sample_answers_fit_every_tab() {
        for property_type in PropertyType::ordered() {
            let args = DemoArgs {
                property_type,
                price: "350.000,00".to_string(),
                informant: "Maria".to_string(),
                photos: 4,
                location: None,
            };
            let mut form = FormController::new(property_type);
            fill_sample(&mut form, &args).expect("sample answers are valid options");
            assert_eq!(form.record().photos.len(), 3);
            assert!(form.begin_submit().is_ok());
        }
    }
}
