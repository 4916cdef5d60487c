use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Coarse offense-severity bucket feeding the base score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RiskTier {
    High,
    Med,
    Low,
    Unscored,
}

impl RiskTier {
    pub const fn base_score(self) -> f64 {
        match self {
            RiskTier::High => 30.0,
            RiskTier::Med => 15.0,
            RiskTier::Low => 5.0,
            RiskTier::Unscored => 10.0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskTier::High => "High",
            RiskTier::Med => "Med",
            RiskTier::Low => "Low",
            RiskTier::Unscored => "Unscored",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RiskTier {
    type Err = TierTableError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(RiskTier::High),
            "med" | "medium" => Ok(RiskTier::Med),
            "low" => Ok(RiskTier::Low),
            "unscored" => Ok(RiskTier::Unscored),
            _ => Err(TierTableError::UnknownTier {
                value: value.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for RiskTier {
    type Error = TierTableError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RiskTier> for String {
    fn from(value: RiskTier) -> Self {
        value.label().to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TierTableError {
    #[error("unknown risk tier '{value}' (expected High, Med, Low, or Unscored)")]
    UnknownTier { value: String },
    #[error("unreadable risk tier table: {0}")]
    Csv(#[from] csv::Error),
}

/// One row of tier data. A blank subcategory applies to the whole category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierEntry {
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub tier: RiskTier,
}

impl TierEntry {
    pub fn new(category: &str, subcategory: Option<&str>, tier: RiskTier) -> Self {
        Self {
            category: category.to_string(),
            subcategory: subcategory.map(str::to_string),
            tier,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TierRow {
    category: String,
    #[serde(default)]
    subcategory: Option<String>,
    risk_score: String,
}

const STANDARD_ENTRIES: &[(&str, &str, RiskTier)] = &[
    ("vehicles & traffic", "license", RiskTier::High),
    ("vehicles & traffic", "license & registration", RiskTier::High),
    ("vehicles & traffic", "speeding", RiskTier::Low),
    ("vehicles & traffic", "traffic violations", RiskTier::Low),
    ("vehicles & traffic", "reckless driving", RiskTier::Med),
    ("criminal intent", "accessory", RiskTier::Low),
    ("criminal intent", "court orders", RiskTier::Med),
    ("violence", "", RiskTier::High),
    ("sexual", "", RiskTier::High),
    ("homicide", "", RiskTier::High),
    ("fraud & deception", "", RiskTier::Med),
    ("drugs & alcohol", "", RiskTier::Med),
    ("theft & property", "", RiskTier::Med),
    ("security", "", RiskTier::High),
    ("statutory", "", RiskTier::Low),
    ("unclassified", "", RiskTier::High),
];

const HIGH_DEFAULT_CATEGORIES: &[&str] =
    &["violence", "sexual", "homicide", "security", "unclassified"];

/// Category/subcategory lookup deciding a charge's risk tier.
///
/// Resolution order: exact `(category, subcategory)` entry, then the
/// category-only entry, then the high-default category list, then the
/// fallback tier. All keys compare case-insensitively.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskTierTable {
    exact: HashMap<(String, String), RiskTier>,
    by_category: HashMap<String, RiskTier>,
    high_default: Vec<String>,
    fallback: RiskTier,
}

impl Default for RiskTierTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RiskTierTable {
    /// The built-in table every deployment starts from.
    pub fn standard() -> Self {
        let mut table = Self {
            exact: HashMap::new(),
            by_category: HashMap::new(),
            high_default: HIGH_DEFAULT_CATEGORIES
                .iter()
                .map(|category| category.to_string())
                .collect(),
            fallback: RiskTier::Med,
        };
        table.merge_entries(STANDARD_ENTRIES.iter().map(|(category, subcategory, tier)| {
            TierEntry::new(category, Some(subcategory), *tier)
        }));
        table
    }

    /// Later entries replace earlier ones that share a key.
    pub fn merge_entries<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = TierEntry>,
    {
        for entry in entries {
            let category = entry.category.trim().to_lowercase();
            match entry
                .subcategory
                .map(|subcategory| subcategory.trim().to_lowercase())
                .filter(|subcategory| !subcategory.is_empty())
            {
                Some(subcategory) => {
                    self.exact.insert((category, subcategory), entry.tier);
                }
                None => {
                    self.by_category.insert(category, entry.tier);
                }
            }
        }
    }

    pub fn lookup(&self, category: &str, subcategory: &str) -> RiskTier {
        let category = category.to_lowercase();
        let subcategory = subcategory.to_lowercase();

        if let Some(tier) = self.exact.get(&(category.clone(), subcategory)) {
            return *tier;
        }
        if let Some(tier) = self.by_category.get(&category) {
            return *tier;
        }
        if self.high_default.iter().any(|known| *known == category) {
            return RiskTier::High;
        }
        self.fallback
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.by_category.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads `category,subcategory,risk_score` rows.
    pub fn read_csv<R: Read>(reader: R) -> Result<Vec<TierEntry>, TierTableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut entries = Vec::new();
        for row in csv_reader.deserialize::<TierRow>() {
            let row = row?;
            if row.category.is_empty() {
                continue;
            }
            entries.push(TierEntry {
                category: row.category,
                subcategory: row.subcategory,
                tier: row.risk_score.parse()?,
            });
        }
        Ok(entries)
    }

    pub fn read_csv_path(path: impl AsRef<Path>) -> Result<Vec<TierEntry>, TierTableError> {
        let file = File::open(path).map_err(csv::Error::from)?;
        Self::read_csv(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subcategory_entries_take_priority() {
        let table = RiskTierTable::standard();
        assert_eq!(table.lookup("Vehicles & Traffic", "Speeding"), RiskTier::Low);
        assert_eq!(
            table.lookup("VEHICLES & TRAFFIC", "License & Registration"),
            RiskTier::High
        );
        assert_eq!(table.lookup("Violence", "Assault"), RiskTier::High);
    }

    #[test]
    fn unknown_categories_fall_back_to_med() {
        let table = RiskTierTable::standard();
        assert_eq!(table.lookup("Vehicles & Traffic", "Parking"), RiskTier::Med);
        assert_eq!(table.lookup("Wildlife", ""), RiskTier::Med);
    }

    #[test]
    fn high_default_applies_when_category_entry_removed() {
        let mut table = RiskTierTable::standard();
        table.by_category.remove("security");
        assert_eq!(table.lookup("Security", "Trespass"), RiskTier::High);
    }

    #[test]
    fn overrides_replace_defaults() {
        let mut table = RiskTierTable::standard();
        table.merge_entries([
            TierEntry::new("Statutory", None, RiskTier::High),
            TierEntry::new("Vehicles & Traffic", Some("Speeding"), RiskTier::Med),
            TierEntry::new("Wildlife", Some(""), RiskTier::Unscored),
        ]);

        assert_eq!(table.lookup("statutory", "anything"), RiskTier::High);
        assert_eq!(table.lookup("vehicles & traffic", "speeding"), RiskTier::Med);
        assert_eq!(table.lookup("wildlife", "poaching"), RiskTier::Unscored);
    }

    #[test]
    fn csv_rows_become_entries() {
        let data = "category,subcategory,risk_score\n\
Vehicles & Traffic, Parking ,Low\n\
Weapons,,high\n\
,,\n";
        let entries = RiskTierTable::read_csv(data.as_bytes()).expect("csv parses");

        assert_eq!(
            entries,
            vec![
                TierEntry::new("Vehicles & Traffic", Some("Parking"), RiskTier::Low),
                TierEntry::new("Weapons", None, RiskTier::High),
            ]
        );
    }

    #[test]
    fn csv_rejects_unknown_tier() {
        let data = "category,subcategory,risk_score\nWeapons,,Severe\n";
        let err = RiskTierTable::read_csv(data.as_bytes()).expect_err("tier rejected");
        assert!(matches!(err, TierTableError::UnknownTier { value } if value == "Severe"));
    }
}
