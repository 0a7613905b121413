use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::catalog::load_catalog;
use crate::cli::{LevelFilter, SearchArgs};
use crate::model::{Category, FoodItem};

/// Free-text lookup over the catalog. Implementations return matches in
/// relevance order; the local implementation keeps catalog order.
pub trait FoodSearch {
    fn search<'a>(&self, catalog: &'a [FoodItem], query: &str) -> Vec<&'a FoodItem>;
}

/// Case-insensitive substring match on names. An empty query matches all.
pub struct SubstringSearch;

impl FoodSearch for SubstringSearch {
    fn search<'a>(&self, catalog: &'a [FoodItem], query: &str) -> Vec<&'a FoodItem> {
        let needle = query.trim().to_lowercase();
        catalog
            .iter()
            .filter(|item| needle.is_empty() || item.name.to_lowercase().contains(&needle))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct SearchFilters {
    pub level: LevelFilter,
    pub category: Option<Category>,
    pub limit: Option<usize>,
}

pub fn run(args: SearchArgs) -> Result<()> {
    let catalog = load_catalog(&args.catalog)?;
    let category = match args.category.as_deref() {
        Some(raw) => match Category::parse(raw) {
            Some(category) => Some(category),
            None => bail!("unknown category: {raw}"),
        },
        None => None,
    };
    let filters = SearchFilters {
        level: args.level,
        category,
        limit: args.limit,
    };

    let results = search_catalog(&SubstringSearch, &catalog, &args.query, &filters);
    info!(
        query = %args.query,
        catalog_items = catalog.len(),
        matches = results.len(),
        "search completed"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &results).context("failed to write results")?;
        writeln!(out).context("failed to write results")?;
    } else {
        for item in &results {
            writeln!(out, "{}", render_line(item)).context("failed to write results")?;
        }
    }

    Ok(())
}

pub fn search_catalog<'a>(
    engine: &dyn FoodSearch,
    catalog: &'a [FoodItem],
    query: &str,
    filters: &SearchFilters,
) -> Vec<&'a FoodItem> {
    let mut results: Vec<&FoodItem> = engine
        .search(catalog, query)
        .into_iter()
        .filter(|item| filters.level.admits(item.purine_level))
        .filter(|item| filters.category.is_none_or(|category| item.category == category))
        .collect();

    if let Some(limit) = filters.limit {
        results.truncate(limit);
    }
    results
}

fn render_line(item: &FoodItem) -> String {
    let purines = item
        .purines
        .map(|value| format!("{value} mg/100g"))
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "{}\t{}\t{}\t{}",
        item.name, purines, item.purine_level, item.category
    )
}
