use ammonia::clean_text;
use survey_form::survey::{
    ChoiceOption, FieldId, FieldKind, FormController, FormStatus, Notice, PropertyRecord,
    PropertyType, MAX_PHOTOS,
};

pub(crate) trait Component {
    /// Render the component to a HTML string. Every value that came from the
    /// field agent is escaped at render time.
    fn render(&self) -> String;
}

const PAGE_SCRIPT: &str = r#"<script>
    async function post(path, body) {
        let res;
        try {
            res = await fetch(path, {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify(body),
            });
        } catch (err) {
            return { notice: { message: 'Sem conexão com o servidor. Tente novamente.', is_error: true } };
        }
        const isJson = (res.headers.get('Content-Type') || '').includes('application/json');
        const payload = isJson ? await res.json().catch(() => null) : null;
        if (res.ok && payload) {
            return payload;
        }
        const message = res.status === 413
            ? 'Arquivo grande demais para envio.'
            : 'Erro ' + res.status + (payload && payload.error ? ': ' + payload.error : '') + '.';
        return { notice: { message, is_error: true } };
    }
    function showNotice(survey) {
        const el = document.getElementById('notice');
        if (survey && survey.notice) {
            el.textContent = survey.notice.message;
            el.className = survey.notice.is_error ? 'notice error' : 'notice';
        }
    }
    document.getElementById('capture-location').addEventListener('click', (ev) => {
        const button = ev.currentTarget;
        if (!navigator.geolocation) {
            post('/api/v1/survey/location', { error: 'unsupported' }).then(showNotice);
            return;
        }
        button.disabled = true;
        button.textContent = 'Buscando...';
        navigator.geolocation.getCurrentPosition(
            (pos) => post('/api/v1/survey/location', {
                latitude: pos.coords.latitude,
                longitude: pos.coords.longitude,
            }).then((survey) => {
                const loc = survey.record && survey.record.location;
                if (loc) {
                    document.getElementById('location-status').textContent =
                        'Lat: ' + loc.latitude.toFixed(6) + ' Long: ' + loc.longitude.toFixed(6);
                }
                showNotice(survey);
            }).finally(() => { button.disabled = false; button.textContent = 'Capturar Localização'; }),
            (err) => post('/api/v1/survey/location', { error: String(err.code) })
                .then(showNotice)
                .finally(() => { button.disabled = false; button.textContent = 'Capturar Localização'; }),
            { enableHighAccuracy: true },
        );
    });
    document.getElementById('photo-input').addEventListener('change', async (ev) => {
        const files = Array.from(ev.target.files || []);
        const photos = await Promise.all(files.map((file) => new Promise((resolve) => {
            const reader = new FileReader();
            reader.onload = () => resolve({ name: file.name, content_type: file.type, data: reader.result });
            reader.readAsDataURL(file);
        })));
        const survey = await post('/api/v1/survey/photos', { photos });
        if (survey.record) {
            document.getElementById('photo-count').textContent = survey.record.photos.length;
        }
        showNotice(survey);
        ev.target.value = '';
    });
</script>"#;

pub(crate) struct TabSelector {
    pub(crate) current: PropertyType,
}

impl Component for TabSelector {
    fn render(&self) -> String {
        let tabs = PropertyType::ordered()
            .into_iter()
            .map(|tab| {
                let class = if tab == self.current { "tab active" } else { "tab" };
                format!(
                    r#"<button type="submit" form="survey-form" formaction="/form/type" name="switch_to" value="{key}" class="{class}">{label}</button>"#,
                    key = tab.key(),
                    label = tab.label(),
                )
            })
            .collect::<Vec<String>>()
            .join("");
        format!(r#"<nav class="tabs">{tabs}</nav>"#)
    }
}

pub(crate) struct TextInput<'a> {
    pub(crate) field: FieldId,
    pub(crate) value: &'a str,
}

impl TextInput<'_> {
    fn input_type(&self) -> (&'static str, &'static str) {
        match self.field {
            FieldId::Price => ("text", "numeric"),
            FieldId::Phone => ("tel", "tel"),
            FieldId::InformantName => ("text", "text"),
            _ => ("number", "decimal"),
        }
    }

    fn placeholder(&self) -> &'static str {
        match self.field {
            FieldId::Price => "Ex: 350.000,00",
            FieldId::Phone => "(00) 00000-0000",
            FieldId::InformantName => "Nome",
            FieldId::LotArea => "Ex: 300",
            FieldId::BuiltArea => "Ex: 80",
            FieldId::Frontage => "Ex: 10",
            FieldId::CondoFee => "Ex: 500,00",
            _ => "",
        }
    }
}

impl Component for TextInput<'_> {
    fn render(&self) -> String {
        let (input_type, input_mode) = self.input_type();
        format!(
            r#"<div class="field">
                <label for="{key}">{label}</label>
                <input id="{key}" name="{key}" type="{input_type}" inputmode="{input_mode}"
                    placeholder="{placeholder}" value="{value}" />
            </div>"#,
            key = self.field.key(),
            label = self.field.label(),
            placeholder = self.placeholder(),
            value = clean_text(self.value),
        )
    }
}

pub(crate) struct RadioGroup {
    pub(crate) field: FieldId,
    pub(crate) selected: Option<&'static str>,
}

impl Component for RadioGroup {
    fn render(&self) -> String {
        let key = self.field.key();
        let mut options = String::new();
        for (option_key, label) in self.field.choices() {
            let checked = if self.selected == Some(option_key) {
                " checked"
            } else {
                ""
            };
            options.push_str(&format!(
                r#"<label class="option"><input type="radio" name="{key}" value="{option_key}"{checked} /> <span>{label}</span></label>"#,
            ));
        }
        format!(
            r#"<fieldset class="field">
                <legend>{legend}</legend>
                <div class="options">{options}</div>
            </fieldset>"#,
            legend = self.field.label(),
        )
    }
}

pub(crate) struct LocationPanel<'a> {
    pub(crate) record: &'a PropertyRecord,
    pub(crate) capturing: bool,
}

impl Component for LocationPanel<'_> {
    fn render(&self) -> String {
        let status = match self.record.location {
            Some(fix) => format!(
                "Lat: {:.6} Long: {:.6}",
                fix.latitude, fix.longitude
            ),
            None => "Nenhuma localização capturada".to_string(),
        };
        let (disabled, caption) = if self.capturing {
            (" disabled", "Buscando...")
        } else {
            ("", "Capturar Localização")
        };
        format!(
            r#"<section class="field">
                <label>{label}</label>
                <p id="location-status">{status}</p>
                <button type="button" id="capture-location"{disabled}>{caption}</button>
            </section>"#,
            label = FieldId::Location.label(),
        )
    }
}

pub(crate) struct PhotoPanel<'a> {
    pub(crate) record: &'a PropertyRecord,
}

impl Component for PhotoPanel<'_> {
    fn render(&self) -> String {
        let names = self
            .record
            .photos
            .iter()
            .map(|photo| format!("<li>{}</li>", clean_text(&photo.name)))
            .collect::<Vec<String>>()
            .join("");
        format!(
            r#"<section class="field">
                <label for="photo-input">{label} (<span id="photo-count">{count}</span>/{MAX_PHOTOS})</label>
                <input type="file" id="photo-input" accept="image/*" capture="environment" multiple />
                <ul class="photos">{names}</ul>
            </section>"#,
            label = FieldId::Photos.label(),
            count = self.record.photos.len(),
        )
    }
}

pub(crate) struct NoticeBanner<'a> {
    pub(crate) notice: Option<&'a Notice>,
}

impl Component for NoticeBanner<'_> {
    fn render(&self) -> String {
        match self.notice {
            Some(notice) => {
                let class = if notice.is_error() {
                    "notice error"
                } else {
                    "notice"
                };
                format!(
                    r#"<p id="notice" class="{class}" role="status">{}</p>"#,
                    clean_text(&notice.message())
                )
            }
            None => r#"<p id="notice" class="notice" role="status"></p>"#.to_string(),
        }
    }
}

/// The whole survey screen for the active tab.
pub(crate) struct SurveyPage<'a> {
    pub(crate) controller: &'a FormController,
    pub(crate) notice: Option<&'a Notice>,
}

impl Component for SurveyPage<'_> {
    fn render(&self) -> String {
        let record = self.controller.record();
        let active = self.controller.active_type();
        let submitting = self.controller.status() == FormStatus::Submitting;

        let mut fields = String::new();
        for field in self.controller.visible_fields().iter() {
            let html = match field.kind() {
                FieldKind::Text => TextInput {
                    field,
                    value: record.text(field).unwrap_or_default(),
                }
                .render(),
                FieldKind::Choice => RadioGroup {
                    field,
                    selected: record.choice(field).map(|(key, _)| key),
                }
                .render(),
                FieldKind::Location | FieldKind::Photos => continue,
            };
            fields.push_str(&html);
        }

        let (disabled, caption) = if submitting {
            (" disabled", "Enviando...")
        } else {
            ("", "Enviar para Planilha")
        };

        format!(
            r#"<!DOCTYPE html>
            <html lang="pt-BR">
                <head>
                    <meta charset="utf-8" />
                    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
                    <title>CARPINA - Observatório de Valores</title>
                </head>
                <body>
                    <header>
                        <h1>CARPINA</h1>
                        <p>Observatório de Valores</p>
                    </header>
                    <button type="submit" form="survey-form" hidden tabindex="-1"{disabled}></button>
                    {tabs}
                    {notice}
                    <main>
                        <form method="post" action="/form" id="survey-form">
                            <input type="hidden" name="type" value="{active_key}" />
                            {fields}
                        </form>
                        {location}
                        {photos}
                    </main>
                    <footer>
                        <button type="submit" form="survey-form"{disabled}>{caption}</button>
                    </footer>
                    {PAGE_SCRIPT}
                </body>
            </html>"#,
            tabs = TabSelector { current: active }.render(),
            notice = NoticeBanner {
                notice: self.notice
            }
            .render(),
            active_key = active.key(),
            location = LocationPanel {
                record,
                capturing: self.controller.status() == FormStatus::LocationCapturing,
            }
            .render(),
            photos = PhotoPanel { record }.render(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn land_page_hides_building_fields() {
        let controller = FormController::new(PropertyType::Land);
        let html = SurveyPage {
            controller: &controller,
            notice: None,
        }
        .render();

        assert!(html.contains(r#"name="isWalled""#));
        assert!(html.contains(r#"name="lotArea""#));
        assert!(!html.contains(r#"name="builtArea""#));
        assert!(!html.contains(r#"name="condoFee""#));
        assert!(!html.contains(r#"name="hasPool""#));
        assert!(!html.contains(r#"name="coverage""#));
        assert!(html.contains(
            r#"formaction="/form/type" name="switch_to" value="land" class="tab active">Terreno</button>"#
        ));
        assert!(html.contains("Enviar para Planilha"));
    }

    #[test]
    fn condo_page_shows_fee_and_pool() {
        let controller = FormController::new(PropertyType::CondoApartment);
        let html = SurveyPage {
            controller: &controller,
            notice: None,
        }
        .render();

        assert!(html.contains(r#"name="condoFee""#));
        assert!(html.contains(r#"name="hasPool""#));
        assert!(!html.contains(r#"name="isWalled""#));
        assert!(!html.contains(r#"name="coverage""#));
    }

    #[test]
    fn entered_values_are_escaped() {
        let input = TextInput {
            field: FieldId::InformantName,
            value: r#""><script>alert(1)</script>"#,
        }
        .render();
        assert!(!input.contains("<script>"));
        assert!(!input.contains(r#"value="">"#));
    }

    #[test]
    fn selected_option_is_checked() {
        let html = RadioGroup {
            field: FieldId::Topography,
            selected: Some("above_grade"),
        }
        .render();
        assert!(html.contains(r#"value="above_grade" checked"#));
        assert_eq!(html.matches(" checked").count(), 1);
    }

    #[test]
    fn error_notices_are_flagged() {
        let notice = Notice::SubmissionFailed;
        let html = NoticeBanner {
            notice: Some(&notice),
        }
        .render();
        assert!(html.contains(r#"class="notice error""#));
        assert!(html.contains("Tente novamente"));
    }

    #[test]
    fn enter_key_submits_rather_than_switching_tabs() {
        let controller = FormController::new(PropertyType::House);
        let html = SurveyPage {
            controller: &controller,
            notice: None,
        }
        .render();

        let default_action = html
            .find(r#"<button type="submit" form="survey-form" hidden"#)
            .expect("default submit button");
        let first_tab = html.find(r#"name="switch_to""#).expect("tab buttons");
        assert!(default_action < first_tab);
        assert_eq!(html.matches(r#"name="switch_to""#).count(), 4);
    }
}
