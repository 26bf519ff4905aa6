//! Which form fields apply to which property type. Rendering and the
//! submission projection both read `RULES`.

use super::domain::{FieldId, PropertyRecord, PropertyType};

const LAND: usize = 0;
const HOUSE: usize = 1;
const CONDO: usize = 2;
const COMMERCIAL: usize = 3;

/// Rows are `(field, [land, house, condo/apartment, commercial])`.
const RULES: [(FieldId, [bool; 4]); 16] = [
    (FieldId::Price, [true, true, true, true]),
    (FieldId::Phone, [true, true, true, true]),
    (FieldId::InformantName, [true, true, true, true]),
    (FieldId::LotArea, [true, true, true, true]),
    (FieldId::BuiltArea, [false, true, true, true]),
    (FieldId::Frontage, [true, true, true, true]),
    (FieldId::CondoFee, [false, false, true, false]),
    (FieldId::BlockPosition, [true, true, true, true]),
    (FieldId::Topography, [true, true, true, true]),
    (FieldId::Floors, [false, true, true, true]),
    (FieldId::Pavement, [true, true, true, true]),
    (FieldId::HasPool, [false, true, true, false]),
    (FieldId::IsWalled, [true, false, false, false]),
    (FieldId::CoverageType, [false, true, false, true]),
    (FieldId::Location, [true, true, true, true]),
    (FieldId::Photos, [true, true, true, true]),
];

const fn column(property_type: PropertyType) -> usize {
    match property_type {
        PropertyType::Land => LAND,
        PropertyType::House => HOUSE,
        PropertyType::CondoApartment => CONDO,
        PropertyType::Commercial => COMMERCIAL,
    }
}

/// Set of visible fields, kept in form order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet {
    fields: Vec<FieldId>,
}

impl FieldSet {
    pub fn contains(&self, field: FieldId) -> bool {
        self.fields.contains(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.fields.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields of the form that this set leaves out.
    pub fn hidden(&self) -> impl Iterator<Item = FieldId> + '_ {
        FieldId::ordered()
            .into_iter()
            .filter(move |field| !self.contains(*field))
    }
}

pub fn visible_fields(property_type: PropertyType) -> FieldSet {
    let col = column(property_type);
    FieldSet {
        fields: RULES
            .iter()
            .filter(|(_, shown)| shown[col])
            .map(|(field, _)| *field)
            .collect(),
    }
}

pub fn is_visible(property_type: PropertyType, field: FieldId) -> bool {
    let col = column(property_type);
    RULES
        .iter()
        .any(|(candidate, shown)| *candidate == field && shown[col])
}

impl PropertyRecord {
    /// Copy of the record with every field hidden for its property type reset
    /// to empty. Values typed under another tab stay in the live record but
    /// never leave the device.
    pub fn visible_projection(&self) -> PropertyRecord {
        let mut projected = self.clone();
        for field in visible_fields(self.property_type).hidden() {
            projected.clear(field);
        }
        projected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::domain::YesNo;
    use std::collections::BTreeSet;

    const ALWAYS: [FieldId; 10] = [
        FieldId::LotArea,
        FieldId::Frontage,
        FieldId::Price,
        FieldId::Phone,
        FieldId::InformantName,
        FieldId::BlockPosition,
        FieldId::Topography,
        FieldId::Pavement,
        FieldId::Location,
        FieldId::Photos,
    ];

    fn expected(property_type: PropertyType) -> BTreeSet<FieldId> {
        let mut fields: BTreeSet<FieldId> = ALWAYS.into_iter().collect();
        let conditional: &[FieldId] = match property_type {
            PropertyType::Land => &[FieldId::IsWalled],
            PropertyType::House => &[
                FieldId::BuiltArea,
                FieldId::Floors,
                FieldId::HasPool,
                FieldId::CoverageType,
            ],
            PropertyType::CondoApartment => &[
                FieldId::BuiltArea,
                FieldId::CondoFee,
                FieldId::Floors,
                FieldId::HasPool,
            ],
            PropertyType::Commercial => &[
                FieldId::BuiltArea,
                FieldId::Floors,
                FieldId::CoverageType,
            ],
        };
        fields.extend(conditional.iter().copied());
        fields
    }

    #[test]
    fn every_type_shows_exactly_its_table_column() {
        for property_type in PropertyType::ordered() {
            let actual: BTreeSet<FieldId> = visible_fields(property_type).iter().collect();
            assert_eq!(actual, expected(property_type), "{property_type:?}");
        }
    }

    #[test]
    fn is_visible_agrees_with_visible_fields() {
        for property_type in PropertyType::ordered() {
            let set = visible_fields(property_type);
            for field in FieldId::ordered() {
                assert_eq!(is_visible(property_type, field), set.contains(field));
            }
        }
    }

    #[test]
    fn land_hides_building_attributes() {
        let hidden: Vec<FieldId> = visible_fields(PropertyType::Land).hidden().collect();
        assert_eq!(
            hidden,
            vec![
                FieldId::BuiltArea,
                FieldId::CondoFee,
                FieldId::Floors,
                FieldId::HasPool,
                FieldId::CoverageType,
            ]
        );
    }

    #[test]
    fn projection_clears_only_hidden_fields() {
        let mut record = PropertyRecord::new(PropertyType::House);
        record.price = "480000".to_string();
        record.built_area = "120".to_string();
        record.has_pool = Some(YesNo::Yes);
        record.is_walled = Some(YesNo::No);

        let projected = record.visible_projection();
        assert_eq!(projected.price, "480000");
        assert_eq!(projected.built_area, "120");
        assert_eq!(projected.has_pool, Some(YesNo::Yes));
        assert_eq!(projected.is_walled, None);
        assert_eq!(record.is_walled, Some(YesNo::No));
    }

    #[test]
    fn rules_cover_every_field_once() {
        let listed: BTreeSet<FieldId> = RULES.iter().map(|(field, _)| *field).collect();
        assert_eq!(listed.len(), RULES.len());
        assert_eq!(listed.len(), FieldId::ordered().len());
    }
}
