use anyhow::{Context, Result};
use regex::Regex;

use crate::error::IngestError;
use crate::model::{FoodItem, RowParseStats, SourceKind};

use super::classify::classify_category;
use super::csv_line::tokenize_csv_line;
use super::names::{NameNormalizer, strip_one_double_quote};

const MIN_FIELDS: usize = 19;
const TOTAL_PURINES_FIELD: usize = 18;

const NOISE_PREFIXES: &[&str] = &["1 ", "2 ", "*", "ND ="];
const NOISE_MARKER: &str = "Sources of data";

const SECTION_HEADERS: &[&str] = &[
    "Beverages",
    "Dairy and Eggs",
    "Finfish and shellfish",
    "Fruits",
    "Legumes and legume products",
    "Nuts and seeds",
    "Sausages and luncheon meats",
    "Sweets",
    "Vegetables",
];
const SECTION_MARKERS: &[&str] = &["Organ Products", "other than organs", "(other than"];
const SECTION_SUFFIX: &str = "products";
const SECTION_PREFIXES: &[&str] = &[
    "Cereal grains",
    "Lamb, veal",
    "Pork organ",
    "Pork (other",
    "Poultry organ",
    "Poultry (other",
    "Soups, sauces",
    "Beef Organ",
    "Beef (other",
    "Vegetarian meat",
];

const MISSING_VALUES: &[&str] = &["", "ND", "-"];

#[derive(Debug, Default)]
pub struct ParsedSource {
    pub items: Vec<FoodItem>,
    pub stats: RowParseStats,
}

enum RowOutcome {
    Item(FoodItem),
    Noise,
    Short,
    SectionHeader,
    MissingPurines,
    UnparseablePurines,
}

pub struct RowParser {
    names: NameNormalizer,
    leading_number: Regex,
}

impl RowParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            names: NameNormalizer::new()?,
            leading_number: Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?")
                .context("failed to compile purine value regex")?,
        })
    }

    /// Parses one export. Only a missing header is an error; every other
    /// problem drops the row and is counted in the returned stats.
    pub fn parse_source(
        &self,
        content: &str,
        kind: SourceKind,
    ) -> Result<ParsedSource, IngestError> {
        let lines: Vec<&str> = content
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).trim())
            .collect();

        let header_prefix = kind.header_prefix();
        let header_index = lines
            .iter()
            .position(|line| line.starts_with(header_prefix))
            .ok_or(IngestError::HeaderNotFound {
                kind,
                prefix: header_prefix,
            })?;

        let mut parsed = ParsedSource::default();
        // Header row is followed by a units row.
        for line in lines.iter().skip(header_index + 2) {
            parsed.stats.lines_scanned += 1;
            match self.parse_row(line, kind) {
                RowOutcome::Item(item) => {
                    parsed.stats.items_emitted += 1;
                    parsed.items.push(item);
                }
                RowOutcome::Noise => parsed.stats.skipped_noise_lines += 1,
                RowOutcome::Short => parsed.stats.skipped_short_rows += 1,
                RowOutcome::SectionHeader => parsed.stats.skipped_section_headers += 1,
                RowOutcome::MissingPurines => parsed.stats.skipped_missing_purines += 1,
                RowOutcome::UnparseablePurines => {
                    parsed.stats.skipped_unparseable_purines += 1
                }
            }
        }

        Ok(parsed)
    }

    fn parse_row(&self, line: &str, kind: SourceKind) -> RowOutcome {
        if is_noise_line(line) {
            return RowOutcome::Noise;
        }

        let fields = tokenize_csv_line(line);
        if fields.len() < MIN_FIELDS {
            return RowOutcome::Short;
        }

        let name = strip_one_double_quote(&fields[0]).trim();
        if name.is_empty() || is_section_header(name) {
            return RowOutcome::SectionHeader;
        }

        let raw_purines = fields[TOTAL_PURINES_FIELD].as_str();
        if MISSING_VALUES.contains(&raw_purines) {
            return RowOutcome::MissingPurines;
        }
        let Some(purines) = self.parse_purines(raw_purines) else {
            return RowOutcome::UnparseablePurines;
        };

        let category = classify_category(name, kind);
        let display_name = self.names.clean(name);
        if display_name.is_empty() {
            return RowOutcome::SectionHeader;
        }

        RowOutcome::Item(FoodItem::measured(display_name, purines, category))
    }

    /// Reads the leading number of a cell, tolerating trailing footnote
    /// letters, and rounds half up to whole milligrams.
    pub fn parse_purines(&self, raw: &str) -> Option<u32> {
        let number = self.leading_number.find(raw.trim())?;
        let value: f64 = number.as_str().parse().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }

        let rounded = (value + 0.5).floor();
        if rounded > f64::from(u32::MAX) {
            return None;
        }
        Some(rounded as u32)
    }
}

pub fn is_noise_line(line: &str) -> bool {
    line.is_empty()
        || NOISE_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
        || line.contains(NOISE_MARKER)
}

/// Group labels embedded in the data region of the USDA tables.
pub fn is_section_header(name: &str) -> bool {
    SECTION_HEADERS.contains(&name)
        || SECTION_MARKERS.iter().any(|marker| name.contains(marker))
        || name.ends_with(SECTION_SUFFIX)
        || SECTION_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}
