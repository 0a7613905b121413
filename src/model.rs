use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Category {
    Seafood,
    Meat,
    Dairy,
    Legumes,
    Grains,
    Nuts,
    Fruits,
    Vegetables,
    Beverages,
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Self::Seafood,
        Self::Meat,
        Self::Dairy,
        Self::Legumes,
        Self::Grains,
        Self::Nuts,
        Self::Fruits,
        Self::Vegetables,
        Self::Beverages,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Seafood => "Seafood",
            Self::Meat => "Meat",
            Self::Dairy => "Dairy",
            Self::Legumes => "Legumes",
            Self::Grains => "Grains",
            Self::Nuts => "Nuts",
            Self::Fruits => "Fruits",
            Self::Vegetables => "Vegetables",
            Self::Beverages => "Beverages",
            Self::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(trimmed))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse purine tier per 100g, used for gout-safe eating guidance.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PurineLevel {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl PurineLevel {
    pub const ALL: [PurineLevel; 4] = [Self::Low, Self::Medium, Self::High, Self::VeryHigh];

    /// Half-open tiers: [0, 100), [100, 200), [200, 300), [300, inf).
    pub fn from_purines(purines: u32) -> Self {
        match purines {
            0..100 => Self::Low,
            100..200 => Self::Medium,
            200..300 => Self::High,
            _ => Self::VeryHigh,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for PurineLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which export a row came from. The two files differ in header text and
/// alcohol rows are always classified as beverages.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Food,
    Alcohol,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Alcohol => "alcohol",
        }
    }

    pub fn header_prefix(self) -> &'static str {
        match self {
            Self::Food => "Food Description,",
            Self::Alcohol => "Alcoholic Beverage Description,",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub name: String,
    /// mg per 100g. `None` only for hand-entered items; ingestion always sets it.
    pub purines: Option<u32>,
    pub category: Category,
    pub purine_level: PurineLevel,
}

impl FoodItem {
    pub fn measured(name: String, purines: u32, category: Category) -> Self {
        Self {
            name,
            purines: Some(purines),
            category,
            purine_level: PurineLevel::from_purines(purines),
        }
    }

    pub fn level_is_consistent(&self) -> bool {
        match self.purines {
            Some(purines) => PurineLevel::from_purines(purines) == self.purine_level,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowParseStats {
    pub lines_scanned: usize,
    pub skipped_noise_lines: usize,
    pub skipped_short_rows: usize,
    pub skipped_section_headers: usize,
    pub skipped_missing_purines: usize,
    pub skipped_unparseable_purines: usize,
    pub items_emitted: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFileEntry {
    pub kind: SourceKind,
    pub filename: String,
    pub sha256: String,
    pub rows: RowParseStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestCounts {
    pub food_items: usize,
    pub alcohol_items: usize,
    pub total_items: usize,
    pub unique_items: usize,
    pub duplicates_dropped: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub started_at: String,
    pub updated_at: String,
    pub data_root: String,
    pub source_folder: String,
    pub output_path: String,
    pub sources: Vec<SourceFileEntry>,
    pub counts: IngestCounts,
}
