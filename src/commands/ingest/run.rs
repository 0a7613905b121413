use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info};

use crate::catalog::{sort_and_dedup, write_catalog};
use crate::cli::IngestArgs;
use crate::model::{
    FoodItem, IngestCounts, IngestRunManifest, RowParseStats, SourceFileEntry, SourceKind,
};
use crate::util::{
    now_utc_string, read_text_file, sha256_file, utc_compact_string, write_json_pretty,
};

use super::rows::{ParsedSource, RowParser};
use super::sources::{DirectoryListing, FsListing, SnapshotLocator, SourceFiles};

#[derive(Debug)]
pub struct CatalogBuild {
    pub sources: SourceFiles,
    pub catalog: Vec<FoodItem>,
    pub food_stats: RowParseStats,
    pub alcohol_stats: RowParseStats,
    pub counts: IngestCounts,
}

pub fn run(args: IngestArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    info!(data_root = %args.data_root.display(), run_id = %run_id, "starting ingest");

    let build = build_catalog(&FsListing, &args.data_root)?;

    if args.dry_run {
        info!(
            folder = %build.sources.folder_name,
            unique_items = build.counts.unique_items,
            "ingest dry-run complete"
        );
        return Ok(());
    }

    write_catalog(&args.output, &build.catalog)?;
    info!(path = %args.output.display(), items = build.catalog.len(), "wrote catalog");

    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        default_manifest_dir(&args.output).join(format!(
            "ingest_run_{}.json",
            utc_compact_string(started_ts)
        ))
    });

    let manifest = IngestRunManifest {
        manifest_version: 1,
        run_id,
        started_at,
        updated_at: now_utc_string(),
        data_root: args.data_root.display().to_string(),
        source_folder: build.sources.folder_name.clone(),
        output_path: args.output.display().to_string(),
        sources: vec![
            source_entry(SourceKind::Food, &build.sources.food, &build.food_stats)?,
            source_entry(SourceKind::Alcohol, &build.sources.alcohol, &build.alcohol_stats)?,
        ],
        counts: build.counts.clone(),
    };

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote ingest run manifest");
    info!(
        unique_items = build.counts.unique_items,
        duplicates_dropped = build.counts.duplicates_dropped,
        "ingest completed"
    );

    Ok(())
}

/// Locates the newest snapshot under `data_root`, parses both exports and
/// returns the sorted, deduplicated catalog.
pub fn build_catalog(listing: &dyn DirectoryListing, data_root: &Path) -> Result<CatalogBuild> {
    let locator = SnapshotLocator::new()?;
    let sources = locator.locate(listing, data_root)?;
    info!(
        folder = %sources.folder_name,
        path = %sources.folder.display(),
        "using data folder"
    );

    let parser = RowParser::new()?;
    let food = parse_source_file(&parser, &sources.food, SourceKind::Food)?;
    let alcohol = parse_source_file(&parser, &sources.alcohol, SourceKind::Alcohol)?;

    let (catalog, counts) = merge_sources(food.items, alcohol.items);

    Ok(CatalogBuild {
        sources,
        catalog,
        food_stats: food.stats,
        alcohol_stats: alcohol.stats,
        counts,
    })
}

/// Food rows go first so they win ties against identically named alcohol rows.
pub fn merge_sources(
    food: Vec<FoodItem>,
    alcohol: Vec<FoodItem>,
) -> (Vec<FoodItem>, IngestCounts) {
    let food_items = food.len();
    let alcohol_items = alcohol.len();

    let mut combined = food;
    combined.extend(alcohol);
    let total_items = combined.len();

    let (catalog, duplicates_dropped) = sort_and_dedup(combined);
    let counts = IngestCounts {
        food_items,
        alcohol_items,
        total_items,
        unique_items: catalog.len(),
        duplicates_dropped,
    };
    (catalog, counts)
}

fn parse_source_file(parser: &RowParser, path: &Path, kind: SourceKind) -> Result<ParsedSource> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!(kind = %kind, file = %filename, "parsing source file");

    let content = read_text_file(path)?;
    let parsed = parser
        .parse_source(&content, kind)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    info!(kind = %kind, items = parsed.items.len(), "parsed source file");
    debug!(
        kind = %kind,
        lines = parsed.stats.lines_scanned,
        noise = parsed.stats.skipped_noise_lines,
        short = parsed.stats.skipped_short_rows,
        section_headers = parsed.stats.skipped_section_headers,
        missing_purines = parsed.stats.skipped_missing_purines,
        unparseable_purines = parsed.stats.skipped_unparseable_purines,
        "row statistics"
    );

    Ok(parsed)
}

fn source_entry(kind: SourceKind, path: &Path, stats: &RowParseStats) -> Result<SourceFileEntry> {
    Ok(SourceFileEntry {
        kind,
        filename: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        sha256: sha256_file(path)?,
        rows: stats.clone(),
    })
}

fn default_manifest_dir(output: &Path) -> PathBuf {
    output
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
        .join("manifests")
}
