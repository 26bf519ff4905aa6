use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::survey::domain::{ChoiceOption, FieldId, FieldKind, PropertyRecord};
use crate::survey::photos::Photo;
use crate::survey::visibility::visible_fields;

/// Photo as embedded in the JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoAttachment {
    pub name: String,
    pub content_type: String,
    /// Standard base64 of the raw image bytes.
    pub data: String,
}

impl From<&Photo> for PhotoAttachment {
    fn from(photo: &Photo) -> Self {
        Self {
            name: photo.name.clone(),
            content_type: photo.content_type.clone(),
            data: STANDARD.encode(&photo.bytes),
        }
    }
}

impl PhotoAttachment {
    pub fn into_value(self) -> Value {
        json!({
            "name": self.name,
            "contentType": self.content_type,
            "data": self.data,
        })
    }
}

/// JSON body posted to the spreadsheet endpoint.
///
/// Keys follow the sheet's columns. Only fields visible for the record's
/// property type are written; unset choices go out as `""` so every visible
/// column receives a cell, and a missing fix goes out as `null` coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SheetPayload(Map<String, Value>);

impl SheetPayload {
    pub fn from_record(record: &PropertyRecord, submitted_at: DateTime<Utc>) -> Self {
        let mut row = Map::new();
        row.insert(
            "type".to_string(),
            Value::from(record.property_type.label()),
        );

        for field in visible_fields(record.property_type).iter() {
            match field.kind() {
                FieldKind::Text => {
                    let value = record.text(field).unwrap_or_default();
                    row.insert(field.key().to_string(), Value::from(value));
                }
                FieldKind::Choice => {
                    let label = record.choice(field).map_or("", |(_, label)| label);
                    row.insert(field.key().to_string(), Value::from(label));
                }
                FieldKind::Location => {
                    row.insert("latitude".to_string(), Value::from(record.latitude()));
                    row.insert("longitude".to_string(), Value::from(record.longitude()));
                }
                FieldKind::Photos => {
                    let photos = record
                        .photos
                        .iter()
                        .map(|photo| PhotoAttachment::from(photo).into_value())
                        .collect();
                    row.insert(field.key().to_string(), Value::Array(photos));
                }
            }
        }

        row.insert(
            "submittedAt".to_string(),
            Value::from(submitted_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        Self(row)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_field(&self, field: FieldId) -> bool {
        match field {
            FieldId::Location => self.0.contains_key("latitude"),
            other => self.0.contains_key(other.key()),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
