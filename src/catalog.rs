//! Static country metadata: codes, names, and view-centering coordinates.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::types::CountryId;

/// Bundled world-countries subset shipped with the crate.
const BUNDLED_JSON: &str = include_str!("../data/countries.json");

/// Official name displayed for North Korea regardless of translation
/// availability.
const PRK_OFFICIAL_NAME: &str = "조선민주주의인민공화국";

/// Canonical and localized name variants for a country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryName {
    /// Canonical English name.
    pub common: String,
}

/// Per-locale translated names. Only the bundled locale is modeled.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Translations {
    /// Korean translation, when available.
    #[serde(default)]
    pub kor: Option<TranslatedName>,
}

/// One translated name entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedName {
    /// Translated common name.
    #[serde(default)]
    pub common: Option<String>,
}

/// Static metadata entry for a single country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    /// ISO 3166-1 alpha-2 code, used to render the flag. Absent for some
    /// territories, which makes them non-playable.
    #[serde(default)]
    pub cca2: Option<String>,
    /// ISO 3166-1 alpha-3 code.
    pub cca3: String,
    /// ISO 3166-1 numeric code as a string, the join key against the
    /// geography dataset. Must parse to a finite number to be usable.
    #[serde(default)]
    pub ccn3: Option<String>,
    /// Name variants.
    pub name: CountryName,
    /// Localized names.
    #[serde(default)]
    pub translations: Translations,
    /// Latitude/longitude pair used to center the view on this country.
    #[serde(default)]
    pub latlng: Option<[f64; 2]>,
}

impl CountryRecord {
    /// Numeric code parsed from `ccn3`, or `None` when absent or not a
    /// finite number.
    pub fn numeric_code(&self) -> Option<CountryId> {
        let raw = self.ccn3.as_deref()?;
        let n: f64 = raw.trim().parse().ok()?;
        if !n.is_finite() || n < 0.0 || n.fract() != 0.0 {
            return None;
        }
        Some(n as CountryId)
    }

    /// Resolved display name: the Korean translation when present, else
    /// the canonical English name, with the fixed official-name override
    /// for North Korea.
    pub fn display_name(&self) -> &str {
        if self.cca3 == "PRK" || self.cca2.as_deref() == Some("KP") {
            return PRK_OFFICIAL_NAME;
        }
        self.translations
            .kor
            .as_ref()
            .and_then(|t| t.common.as_deref())
            .unwrap_or(&self.name.common)
    }
}

/// Catalog decode failures.
#[derive(Debug)]
pub enum CatalogError {
    /// The source document was not valid catalog JSON.
    Parse(serde_json::Error),
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Read-only country metadata table keyed by numeric code.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<CountryRecord>,
    by_numeric: HashMap<CountryId, usize>,
}

impl Catalog {
    /// Builds a catalog from already-decoded records. The first record
    /// claiming a numeric code wins; later duplicates are unreachable via
    /// [`Catalog::by_numeric`].
    pub fn new(records: Vec<CountryRecord>) -> Self {
        let mut by_numeric = HashMap::new();
        for (idx, rec) in records.iter().enumerate() {
            if let Some(code) = rec.numeric_code() {
                by_numeric.entry(code).or_insert(idx);
            }
        }
        Self { records, by_numeric }
    }

    /// Decodes a catalog from world-countries style JSON.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<CountryRecord> = serde_json::from_str(json)?;
        Ok(Self::new(records))
    }

    /// Decodes the catalog bundled with the crate.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_JSON)
    }

    /// Looks up a record by numeric country code.
    pub fn by_numeric(&self, code: CountryId) -> Option<&CountryRecord> {
        self.by_numeric.get(&code).map(|idx| &self.records[*idx])
    }

    /// All records in catalog order.
    pub fn records(&self) -> &[CountryRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the catalog holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
