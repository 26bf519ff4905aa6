use std::fmt;

use super::domain::{FieldId, PropertyRecord};

/// Fields that must be filled before a record may be submitted.
pub const REQUIRED_FIELDS: [FieldId; 2] = [FieldId::Price, FieldId::InformantName];

/// Submission blocked because required fields are blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub missing: Vec<FieldId>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.missing.iter().map(|field| field.label()).collect();
        write!(f, "required fields missing: {}", labels.join(", "))
    }
}

impl std::error::Error for ValidationError {}

/// Minimal client-side check. Whitespace-only input counts as blank.
pub fn validate(record: &PropertyRecord) -> Result<(), ValidationError> {
    let missing: Vec<FieldId> = REQUIRED_FIELDS
        .into_iter()
        .filter(|field| {
            record
                .text(*field)
                .map_or(true, |value| value.trim().is_empty())
        })
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::domain::PropertyType;

    #[test]
    fn price_and_informant_are_required() {
        let record = PropertyRecord::new(PropertyType::Land);
        let err = validate(&record).expect_err("empty record is invalid");
        assert_eq!(err.missing, vec![FieldId::Price, FieldId::InformantName]);
        assert_eq!(
            err.to_string(),
            "required fields missing: Preço (R$), Informante"
        );
    }

    #[test]
    fn blank_informant_is_reported_alone() {
        let mut record = PropertyRecord::new(PropertyType::House);
        record.price = "350000".to_string();
        record.informant_name = "   ".to_string();
        let err = validate(&record).expect_err("blank informant");
        assert_eq!(err.missing, vec![FieldId::InformantName]);
    }

    #[test]
    fn optional_fields_do_not_block_submission() {
        let mut record = PropertyRecord::new(PropertyType::Commercial);
        record.price = "1.200.000,00".to_string();
        record.informant_name = "Maria".to_string();
        assert!(validate(&record).is_ok());
    }
}
