use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::catalog::load_catalog;
use crate::cli::StatusArgs;
use crate::commands::ingest::{DirectoryListing, FsListing, SnapshotLocator};
use crate::model::{Category, FoodItem, PurineLevel};

pub fn run(args: StatusArgs) -> Result<()> {
    info!(catalog = %args.catalog.display(), "status requested");

    match latest_snapshot(&FsListing, &args.data_root)? {
        Some(folder) => info!(
            data_root = %args.data_root.display(),
            folder = %folder,
            "latest data folder"
        ),
        None => warn!(data_root = %args.data_root.display(), "no dated data folder found"),
    }

    if !args.catalog.exists() {
        warn!(path = %args.catalog.display(), "catalog file missing");
        return Ok(());
    }

    let catalog = load_catalog(&args.catalog)?;
    let summary = CatalogSummary::from_items(&catalog);

    info!(items = summary.total, unknown_purines = summary.unknown_purines, "loaded catalog");
    for (category, count) in &summary.by_category {
        info!(category = %category, items = count, "category count");
    }
    for (level, count) in &summary.by_level {
        info!(level = %level, items = count, "purine level count");
    }

    Ok(())
}

fn latest_snapshot(listing: &dyn DirectoryListing, data_root: &Path) -> Result<Option<String>> {
    if !data_root.is_dir() {
        return Ok(None);
    }
    let locator = SnapshotLocator::new()?;
    let folders = listing.list_subdirectories(data_root)?;
    Ok(locator.select_latest(folders.iter().map(String::as_str)))
}

#[derive(Debug, Default)]
struct CatalogSummary {
    total: usize,
    unknown_purines: usize,
    by_category: BTreeMap<&'static str, usize>,
    by_level: Vec<(PurineLevel, usize)>,
}

impl CatalogSummary {
    fn from_items(items: &[FoodItem]) -> Self {
        let mut by_category = BTreeMap::new();
        for category in Category::ALL {
            let count = items.iter().filter(|item| item.category == category).count();
            if count > 0 {
                by_category.insert(category.as_str(), count);
            }
        }

        let by_level = PurineLevel::ALL
            .into_iter()
            .map(|level| {
                let count = items.iter().filter(|item| item.purine_level == level).count();
                (level, count)
            })
            .collect();

        Self {
            total: items.len(),
            unknown_purines: items.iter().filter(|item| item.purines.is_none()).count(),
            by_category,
            by_level,
        }
    }
}
