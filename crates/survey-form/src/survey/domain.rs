use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::photos::PhotoAlbum;

/// Closed set of answers for a single-select form field.
///
/// Each option carries a stable snake_case key (used by the JSON API) and the
/// label shown to the field agent, which is also what the spreadsheet stores.
pub trait ChoiceOption: Copy + Sized + 'static {
    fn options() -> &'static [Self];
    fn key(self) -> &'static str;
    fn label(self) -> &'static str;

    /// Accepts either the key or the label, ignoring surrounding whitespace and
    /// letter case.
    fn parse_choice(raw: &str) -> Option<Self> {
        let needle = raw.trim();
        Self::options().iter().copied().find(|option| {
            option.key().eq_ignore_ascii_case(needle) || option.label().eq_ignore_ascii_case(needle)
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    #[default]
    Land,
    House,
    CondoApartment,
    Commercial,
}

impl PropertyType {
    pub const fn ordered() -> [Self; 4] {
        [Self::Land, Self::House, Self::CondoApartment, Self::Commercial]
    }
}

impl ChoiceOption for PropertyType {
    fn options() -> &'static [Self] {
        &[Self::Land, Self::House, Self::CondoApartment, Self::Commercial]
    }

    fn key(self) -> &'static str {
        match self {
            Self::Land => "land",
            Self::House => "house",
            Self::CondoApartment => "condo_apartment",
            Self::Commercial => "commercial",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Land => "Terreno",
            Self::House => "Casa",
            Self::CondoApartment => "Cond/Apto",
            Self::Commercial => "Comercial",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown property type '{0}'")]
pub struct UnknownPropertyType(pub String);

impl FromStr for PropertyType {
    type Err = UnknownPropertyType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_choice(s).ok_or_else(|| UnknownPropertyType(s.to_string()))
    }
}

/// Where the parcel sits relative to its city block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockPosition {
    Corner,
    MidBlock,
    Rear,
}

impl ChoiceOption for BlockPosition {
    fn options() -> &'static [Self] {
        &[Self::Corner, Self::MidBlock, Self::Rear]
    }

    fn key(self) -> &'static str {
        match self {
            Self::Corner => "corner",
            Self::MidBlock => "mid_block",
            Self::Rear => "rear",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Corner => "Esquina",
            Self::MidBlock => "Meio de quadra",
            Self::Rear => "Fundos",
        }
    }
}

/// Grade of the parcel relative to street level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topography {
    Level,
    AboveGrade,
    BelowGrade,
    Uneven,
}

impl ChoiceOption for Topography {
    fn options() -> &'static [Self] {
        &[Self::Level, Self::AboveGrade, Self::BelowGrade, Self::Uneven]
    }

    fn key(self) -> &'static str {
        match self {
            Self::Level => "level",
            Self::AboveGrade => "above_grade",
            Self::BelowGrade => "below_grade",
            Self::Uneven => "uneven",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Level => "Plano ao nível",
            Self::AboveGrade => "Acima do nível",
            Self::BelowGrade => "Abaixo do nível",
            Self::Uneven => "Acidentado/Inclinado",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Floors {
    GroundFloorOnly,
    MultipleFloors,
}

impl ChoiceOption for Floors {
    fn options() -> &'static [Self] {
        &[Self::GroundFloorOnly, Self::MultipleFloors]
    }

    fn key(self) -> &'static str {
        match self {
            Self::GroundFloorOnly => "ground_floor_only",
            Self::MultipleFloors => "multiple_floors",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::GroundFloorOnly => "Térreo",
            Self::MultipleFloors => "Andares",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pavement {
    Unpaved,
    Cobblestone,
    Asphalt,
}

impl ChoiceOption for Pavement {
    fn options() -> &'static [Self] {
        &[Self::Unpaved, Self::Cobblestone, Self::Asphalt]
    }

    fn key(self) -> &'static str {
        match self {
            Self::Unpaved => "unpaved",
            Self::Cobblestone => "cobblestone",
            Self::Asphalt => "asphalt",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Unpaved => "Solo",
            Self::Cobblestone => "Paralelepípedo",
            Self::Asphalt => "Asfalto",
        }
    }
}

/// Answer for the tri-state questions (pool, walls); unset is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YesNo {
    Yes,
    No,
}

impl ChoiceOption for YesNo {
    fn options() -> &'static [Self] {
        &[Self::Yes, Self::No]
    }

    fn key(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Yes => "Sim",
            Self::No => "Não",
        }
    }
}

/// Roofing construction style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageType {
    Slab,
    RoofTile,
    Other,
}

impl ChoiceOption for CoverageType {
    fn options() -> &'static [Self] {
        &[Self::Slab, Self::RoofTile, Self::Other]
    }

    fn key(self) -> &'static str {
        match self {
            Self::Slab => "slab",
            Self::RoofTile => "roof_tile",
            Self::Other => "other",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Slab => "Laje",
            Self::RoofTile => "Telhado",
            Self::Other => "Outro",
        }
    }
}

/// A captured GPS fix. Latitude and longitude only ever travel together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Every field the form can show. The key doubles as the spreadsheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    Price,
    Phone,
    InformantName,
    LotArea,
    BuiltArea,
    Frontage,
    CondoFee,
    BlockPosition,
    Topography,
    Floors,
    Pavement,
    HasPool,
    IsWalled,
    CoverageType,
    Location,
    Photos,
}

impl FieldId {
    pub const fn ordered() -> [Self; 16] {
        [
            Self::Price,
            Self::Phone,
            Self::InformantName,
            Self::LotArea,
            Self::BuiltArea,
            Self::Frontage,
            Self::CondoFee,
            Self::BlockPosition,
            Self::Topography,
            Self::Floors,
            Self::Pavement,
            Self::HasPool,
            Self::IsWalled,
            Self::CoverageType,
            Self::Location,
            Self::Photos,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Phone => "phone",
            Self::InformantName => "informantName",
            Self::LotArea => "lotArea",
            Self::BuiltArea => "builtArea",
            Self::Frontage => "frontage",
            Self::CondoFee => "condoFee",
            Self::BlockPosition => "quadraStatus",
            Self::Topography => "topography",
            Self::Floors => "floors",
            Self::Pavement => "pavement",
            Self::HasPool => "hasPool",
            Self::IsWalled => "isWalled",
            Self::CoverageType => "coverage",
            Self::Location => "location",
            Self::Photos => "photos",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Price => "Preço (R$)",
            Self::Phone => "Telefone",
            Self::InformantName => "Informante",
            Self::LotArea => "Área lote (m²)",
            Self::BuiltArea => "Área constr. (m²)",
            Self::Frontage => "Testada (m)",
            Self::CondoFee => "Taxa de Condomínio (R$)",
            Self::BlockPosition => "Situação de Quadra",
            Self::Topography => "Topografia",
            Self::Floors => "Andares",
            Self::Pavement => "Pavimentação",
            Self::HasPool => "Piscina",
            Self::IsWalled => "Murado",
            Self::CoverageType => "Tipo de Cobertura",
            Self::Location => "Coordenadas GPS",
            Self::Photos => "Fotos do Imóvel",
        }
    }

    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Price
            | Self::Phone
            | Self::InformantName
            | Self::LotArea
            | Self::BuiltArea
            | Self::Frontage
            | Self::CondoFee => FieldKind::Text,
            Self::BlockPosition
            | Self::Topography
            | Self::Floors
            | Self::Pavement
            | Self::HasPool
            | Self::IsWalled
            | Self::CoverageType => FieldKind::Choice,
            Self::Location => FieldKind::Location,
            Self::Photos => FieldKind::Photos,
        }
    }

    /// Looks a field up by its wire key (`informantName`) or its snake_case
    /// identifier (`informant_name`).
    pub fn from_key(raw: &str) -> Option<Self> {
        let needle = raw.trim();
        Self::ordered().into_iter().find(|field| {
            field.key().eq_ignore_ascii_case(needle) || field.snake_key() == needle
        })
    }

    fn snake_key(self) -> &'static str {
        match self {
            Self::InformantName => "informant_name",
            Self::LotArea => "lot_area",
            Self::BuiltArea => "built_area",
            Self::CondoFee => "condo_fee",
            Self::BlockPosition => "block_position",
            Self::HasPool => "has_pool",
            Self::IsWalled => "is_walled",
            Self::CoverageType => "coverage_type",
            other => other.key(),
        }
    }

    /// Options offered for a single-select field, as `(key, label)` pairs.
    pub fn choices(self) -> Vec<(&'static str, &'static str)> {
        fn pairs<T: ChoiceOption>() -> Vec<(&'static str, &'static str)> {
            T::options()
                .iter()
                .map(|option| (option.key(), option.label()))
                .collect()
        }

        match self {
            Self::BlockPosition => pairs::<BlockPosition>(),
            Self::Topography => pairs::<Topography>(),
            Self::Floors => pairs::<Floors>(),
            Self::Pavement => pairs::<Pavement>(),
            Self::HasPool | Self::IsWalled => pairs::<YesNo>(),
            Self::CoverageType => pairs::<CoverageType>(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Choice,
    Location,
    Photos,
}

/// One property survey entry.
///
/// Conditional fields are always present here; which of them matter for the
/// current `property_type` is decided by [`super::visibility::visible_fields`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyRecord {
    pub property_type: PropertyType,
    pub price: String,
    pub phone: String,
    pub informant_name: String,
    pub lot_area: String,
    pub built_area: String,
    pub frontage: String,
    pub condo_fee: String,
    pub block_position: Option<BlockPosition>,
    pub topography: Option<Topography>,
    pub floors: Option<Floors>,
    pub pavement: Option<Pavement>,
    pub has_pool: Option<YesNo>,
    pub is_walled: Option<YesNo>,
    pub coverage_type: Option<CoverageType>,
    pub location: Option<Coordinates>,
    pub photos: PhotoAlbum,
}

impl PropertyRecord {
    /// Fresh record with every field empty except the property type.
    pub fn new(property_type: PropertyType) -> Self {
        Self {
            property_type,
            ..Self::default()
        }
    }

    pub fn latitude(&self) -> Option<f64> {
        self.location.map(|coords| coords.latitude)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.location.map(|coords| coords.longitude)
    }

    pub fn text(&self, field: FieldId) -> Option<&str> {
        let value = match field {
            FieldId::Price => &self.price,
            FieldId::Phone => &self.phone,
            FieldId::InformantName => &self.informant_name,
            FieldId::LotArea => &self.lot_area,
            FieldId::BuiltArea => &self.built_area,
            FieldId::Frontage => &self.frontage,
            FieldId::CondoFee => &self.condo_fee,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub(crate) fn text_mut(&mut self, field: FieldId) -> Option<&mut String> {
        let value = match field {
            FieldId::Price => &mut self.price,
            FieldId::Phone => &mut self.phone,
            FieldId::InformantName => &mut self.informant_name,
            FieldId::LotArea => &mut self.lot_area,
            FieldId::BuiltArea => &mut self.built_area,
            FieldId::Frontage => &mut self.frontage,
            FieldId::CondoFee => &mut self.condo_fee,
            _ => return None,
        };
        Some(value)
    }

    /// Selected option of a single-select field as `(key, label)`.
    pub fn choice(&self, field: FieldId) -> Option<(&'static str, &'static str)> {
        fn pair<T: ChoiceOption>(value: Option<T>) -> Option<(&'static str, &'static str)> {
            value.map(|option| (option.key(), option.label()))
        }

        match field {
            FieldId::BlockPosition => pair(self.block_position),
            FieldId::Topography => pair(self.topography),
            FieldId::Floors => pair(self.floors),
            FieldId::Pavement => pair(self.pavement),
            FieldId::HasPool => pair(self.has_pool),
            FieldId::IsWalled => pair(self.is_walled),
            FieldId::CoverageType => pair(self.coverage_type),
            _ => None,
        }
    }

    /// Sets a single-select field from a key or label; an empty value clears it.
    /// Returns `false` when the value is not one of the field's options or the
    /// field is not single-select.
    pub(crate) fn apply_choice(&mut self, field: FieldId, raw: &str) -> bool {
        fn parse<T: ChoiceOption>(raw: &str, slot: &mut Option<T>) -> bool {
            if raw.trim().is_empty() {
                *slot = None;
                return true;
            }
            match T::parse_choice(raw) {
                Some(value) => {
                    *slot = Some(value);
                    true
                }
                None => false,
            }
        }

        match field {
            FieldId::BlockPosition => parse(raw, &mut self.block_position),
            FieldId::Topography => parse(raw, &mut self.topography),
            FieldId::Floors => parse(raw, &mut self.floors),
            FieldId::Pavement => parse(raw, &mut self.pavement),
            FieldId::HasPool => parse(raw, &mut self.has_pool),
            FieldId::IsWalled => parse(raw, &mut self.is_walled),
            FieldId::CoverageType => parse(raw, &mut self.coverage_type),
            _ => false,
        }
    }

    /// Resets one field to its empty/unset value.
    pub fn clear(&mut self, field: FieldId) {
        if let Some(value) = self.text_mut(field) {
            value.clear();
            return;
        }
        match field {
            FieldId::BlockPosition => self.block_position = None,
            FieldId::Topography => self.topography = None,
            FieldId::Floors => self.floors = None,
            FieldId::Pavement => self.pavement = None,
            FieldId::HasPool => self.has_pool = None,
            FieldId::IsWalled => self.is_walled = None,
            FieldId::CoverageType => self.coverage_type = None,
            FieldId::Location => self.location = None,
            FieldId::Photos => self.photos.clear(),
            _ => {}
        }
    }

    /// Whether the field holds anything other than its empty value.
    pub fn is_set(&self, field: FieldId) -> bool {
        match field.kind() {
            FieldKind::Text => self.text(field).is_some_and(|value| !value.is_empty()),
            FieldKind::Choice => self.choice(field).is_some(),
            FieldKind::Location => self.location.is_some(),
            FieldKind::Photos => !self.photos.is_empty(),
        }
    }
}
