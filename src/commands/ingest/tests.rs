use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::classify::classify_category;
use super::csv_line::tokenize_csv_line;
use super::names::{NameNormalizer, capitalize_words};
use super::rows::{RowParser, is_noise_line, is_section_header};
use super::run::{build_catalog, merge_sources, run};
use super::sources::{DirectoryListing, FsListing, SnapshotLocator};
use crate::catalog::load_catalog;
use crate::cli::IngestArgs;
use crate::error::IngestError;
use crate::model::{Category, FoodItem, IngestRunManifest, PurineLevel, SourceKind};

const FOOD_HEADER: &str = "Food Description,Adenine,Guanine,Hypoxanthine,Xanthine,Total Purines";
const ALCOHOL_HEADER: &str =
    "Alcoholic Beverage Description,Adenine,Guanine,Hypoxanthine,Xanthine,Total Purines";
const UNITS: &str = ",mg/100g,mg/100g,mg/100g,mg/100g,mg/100g";

/// A 20-column row with the total purines cell in column 18.
fn data_row(name: &str, purines: &str) -> String {
    let mut fields = vec![format!("\"{name}\"")];
    fields.extend((1..18).map(|index| format!("{index}.0")));
    fields.push(purines.to_string());
    fields.push("0.5".to_string());
    fields.join(",")
}

fn csv_document(header: &str, rows: &[String]) -> String {
    let mut lines = vec![
        "USDA Database for the Purine Content of Foods".to_string(),
        "Sources of data are listed in the documentation".to_string(),
        header.to_string(),
        UNITS.to_string(),
    ];
    lines.extend(rows.iter().cloned());
    lines.push(String::new());
    lines.push("ND = not determined".to_string());
    lines.join("\r\n")
}

struct MemoryListing {
    folders: Vec<String>,
    files: HashMap<String, Vec<String>>,
}

impl MemoryListing {
    fn new(folders: &[&str]) -> Self {
        Self {
            folders: folders.iter().map(|name| name.to_string()).collect(),
            files: HashMap::new(),
        }
    }

    fn with_files(mut self, folder: &str, files: &[&str]) -> Self {
        self.files.insert(
            folder.to_string(),
            files.iter().map(|name| name.to_string()).collect(),
        );
        self
    }
}

impl DirectoryListing for MemoryListing {
    fn list_subdirectories(&self, _root: &Path) -> Result<Vec<String>> {
        Ok(self.folders.clone())
    }

    fn list_files(&self, folder: &Path) -> Result<Vec<String>> {
        let key = folder
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        Ok(self.files.get(key).cloned().unwrap_or_default())
    }
}

fn write_snapshot(root: &Path, folder: &str, food_rows: &[String], alcohol_rows: &[String]) {
    let dir = root.join(folder);
    fs::create_dir_all(&dir).expect("create snapshot dir");
    fs::write(
        dir.join("purine_food.csv"),
        csv_document(FOOD_HEADER, food_rows),
    )
    .expect("write food csv");
    fs::write(
        dir.join("purine_alcohol.csv"),
        csv_document(ALCOHOL_HEADER, alcohol_rows),
    )
    .expect("write alcohol csv");
}

#[test]
fn tokenize_csv_line_keeps_commas_inside_quotes() {
    assert_eq!(tokenize_csv_line(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
}

#[test]
fn tokenize_csv_line_trims_fields_and_keeps_empty_ones() {
    assert_eq!(tokenize_csv_line(" x , y "), vec!["x", "y"]);
    assert_eq!(tokenize_csv_line("a,,b,"), vec!["a", "", "b", ""]);
}

#[test]
fn tokenize_csv_line_does_not_unescape_doubled_quotes() {
    assert_eq!(tokenize_csv_line(r#""say ""hi""",x"#), vec!["say hi", "x"]);
}

#[test]
fn select_latest_picks_greatest_dated_name() {
    let locator = SnapshotLocator::new().expect("locator");
    let picked = locator.select_latest(["2023-01-01", "2024-05-05", "2024-05-04"]);
    assert_eq!(picked.as_deref(), Some("2024-05-05"));
}

#[test]
fn select_latest_ignores_names_that_are_not_exact_dates() {
    let locator = SnapshotLocator::new().expect("locator");
    let picked = locator.select_latest(["2024-5-05", "latest", "2099-01-01-old", "2022-12-31"]);
    assert_eq!(picked.as_deref(), Some("2022-12-31"));
    assert_eq!(locator.select_latest(["archive", "2024_05_05"]), None);
}

#[test]
fn locate_finds_food_and_alcohol_files_in_latest_folder() {
    let locator = SnapshotLocator::new().expect("locator");
    let listing = MemoryListing::new(&["2023-01-01", "2024-05-05", "notes"])
        .with_files("2024-05-05", &["readme.txt", "purine_alcohol.csv", "purine_food.csv"]);

    let sources = locator
        .locate(&listing, Path::new("data"))
        .expect("sources located");
    assert_eq!(sources.folder_name, "2024-05-05");
    assert_eq!(sources.food, PathBuf::from("data/2024-05-05/purine_food.csv"));
    assert_eq!(
        sources.alcohol,
        PathBuf::from("data/2024-05-05/purine_alcohol.csv")
    );
}

#[test]
fn locate_fails_without_dated_folders() {
    let locator = SnapshotLocator::new().expect("locator");
    let listing = MemoryListing::new(&["archive", "manifests"]);

    let err = locator
        .locate(&listing, Path::new("data"))
        .expect_err("no dated folder");
    assert!(matches!(
        err.downcast_ref::<IngestError>(),
        Some(IngestError::NoDataFound { .. })
    ));
}

#[test]
fn locate_fails_when_alcohol_file_is_missing() {
    let locator = SnapshotLocator::new().expect("locator");
    let listing = MemoryListing::new(&["2024-05-05"])
        .with_files("2024-05-05", &["purine_food.csv", "alcohol_notes.txt"]);

    let err = locator
        .locate(&listing, Path::new("data"))
        .expect_err("alcohol file missing");
    assert!(matches!(
        err.downcast_ref::<IngestError>(),
        Some(IngestError::MissingSourceFile {
            kind: SourceKind::Alcohol,
            ..
        })
    ));
}

#[test]
fn locate_fails_when_food_file_is_missing() {
    let locator = SnapshotLocator::new().expect("locator");
    let listing = MemoryListing::new(&["2024-05-05"])
        .with_files("2024-05-05", &["purine_alcohol.csv", "food_notes.txt"]);

    let err = locator
        .locate(&listing, Path::new("data"))
        .expect_err("food file missing");
    assert!(matches!(
        err.downcast_ref::<IngestError>(),
        Some(IngestError::MissingSourceFile {
            kind: SourceKind::Food,
            ..
        })
    ));
}

#[test]
fn purine_level_boundaries_are_half_open() {
    assert_eq!(PurineLevel::from_purines(0), PurineLevel::Low);
    assert_eq!(PurineLevel::from_purines(99), PurineLevel::Low);
    assert_eq!(PurineLevel::from_purines(100), PurineLevel::Medium);
    assert_eq!(PurineLevel::from_purines(199), PurineLevel::Medium);
    assert_eq!(PurineLevel::from_purines(200), PurineLevel::High);
    assert_eq!(PurineLevel::from_purines(299), PurineLevel::High);
    assert_eq!(PurineLevel::from_purines(300), PurineLevel::VeryHigh);
    assert_eq!(PurineLevel::from_purines(1200), PurineLevel::VeryHigh);
}

#[test]
fn clean_name_handles_documented_forms() {
    let names = NameNormalizer::new().expect("normalizer");
    assert_eq!(names.clean("'Bacon', meatless"), "Bacon (Meatless)");
    assert_eq!(names.clean("chicken, raw6"), "Chicken");
    assert_eq!(names.clean("beef, dried"), "Beef (Dried)");
}

#[test]
fn clean_name_normalizes_quotes_and_trailing_qualifiers() {
    let names = NameNormalizer::new().expect("normalizer");
    assert_eq!(names.clean("\u{201C}Salmon\u{201D}"), "Salmon");
    assert_eq!(names.clean("\u{2018}Sausage\u{2019}, meatless"), "Sausage (Meatless)");
    assert_eq!(names.clean("rice, fresh"), "Rice");
    assert_eq!(names.clean("Pork loin, RAW"), "Pork Loin");
    assert_eq!(names.clean("soybeans (not further specified)"), "Soybeans");
    assert_eq!(names.clean("shiitake (no further specified)"), "Shiitake");
    assert_eq!(names.clean("Beef (unspecified)"), "Beef");
    assert_eq!(names.clean("oyster, raw12"), "Oyster");
    assert_eq!(names.clean("cod roe raw3"), "Cod Roe");
}

#[test]
fn clean_name_leaves_words_ending_in_raw_alone() {
    let names = NameNormalizer::new().expect("normalizer");
    assert_eq!(names.clean("straw"), "Straw");
    assert_eq!(names.clean("Rice straw mushroom, raw"), "Rice Straw Mushroom");
}

#[test]
fn clean_name_strips_raw_footnote_glued_to_previous_word() {
    let names = NameNormalizer::new().expect("normalizer");
    assert_eq!(names.clean("Oysterraw2"), "Oyster");
    assert_eq!(names.clean("Beefraw6"), "Beef");
    assert_eq!(names.clean("Anchovy,raw12"), "Anchovy");
}

#[test]
fn capitalize_words_skips_opening_punctuation() {
    assert_eq!(capitalize_words("beef (dried) jerky"), "Beef (Dried) Jerky");
    assert_eq!(capitalize_words("'regular' beer"), "'Regular' Beer");
    assert_eq!(capitalize_words("egg  white"), "Egg  White");
}

#[test]
fn classify_category_uses_priority_order() {
    assert_eq!(classify_category("Salmon, raw", SourceKind::Food), Category::Seafood);
    assert_eq!(classify_category("Beef heart", SourceKind::Food), Category::Meat);
    assert_eq!(classify_category("Cream cheese", SourceKind::Food), Category::Dairy);
    assert_eq!(classify_category("Green beans", SourceKind::Food), Category::Legumes);
    assert_eq!(classify_category("Udon noodles", SourceKind::Food), Category::Grains);
    assert_eq!(classify_category("Almond", SourceKind::Food), Category::Nuts);
    assert_eq!(classify_category("Mango", SourceKind::Food), Category::Fruits);
    assert_eq!(classify_category("Spinach", SourceKind::Food), Category::Vegetables);
    assert_eq!(classify_category("Green tea", SourceKind::Food), Category::Beverages);
    assert_eq!(classify_category("Honey", SourceKind::Food), Category::Other);
}

#[test]
fn classify_category_treats_alcohol_as_beverages() {
    assert_eq!(classify_category("Salmon liqueur", SourceKind::Alcohol), Category::Beverages);
}

#[test]
fn section_headers_and_noise_lines_are_recognized() {
    assert!(is_section_header("Beverages"));
    assert!(is_section_header("Beef Organ Products"));
    assert!(is_section_header("Pork (other than organs)"));
    assert!(is_section_header("Soy products"));
    assert!(is_section_header("Vegetarian meat substitutes"));
    assert!(!is_section_header("Beef, liver"));

    assert!(is_noise_line(""));
    assert!(is_noise_line("1 Data from a single sample"));
    assert!(is_noise_line("2 Calculated value"));
    assert!(is_noise_line("Table 3. Sources of data, see references"));
    assert!(is_noise_line("* estimated"));
    assert!(is_noise_line("ND = not determined"));
    assert!(!is_noise_line("\"Anchovy, raw\",1,2"));
}

#[test]
fn parse_purines_rounds_and_tolerates_footnote_letters() {
    let parser = RowParser::new().expect("parser");
    assert_eq!(parser.parse_purines("150.4"), Some(150));
    assert_eq!(parser.parse_purines("99.5"), Some(100));
    assert_eq!(parser.parse_purines("12a"), Some(12));
    assert_eq!(parser.parse_purines("abc"), None);
    assert_eq!(parser.parse_purines("-3"), None);
}

#[test]
fn parse_source_skips_placeholder_purines_and_rounds_values() {
    let parser = RowParser::new().expect("parser");
    let content = csv_document(
        FOOD_HEADER,
        &[
            data_row("Mackerel, raw", "ND"),
            data_row("Lentils, dried", "150.4"),
            data_row("Sardine, raw", "-"),
            data_row("Honey", ""),
        ],
    );

    let parsed = parser
        .parse_source(&content, SourceKind::Food)
        .expect("parsed");
    assert_eq!(
        parsed.items,
        vec![FoodItem {
            name: "Lentils (Dried)".to_string(),
            purines: Some(150),
            category: Category::Legumes,
            purine_level: PurineLevel::Medium,
        }]
    );
    assert_eq!(parsed.stats.skipped_missing_purines, 3);
    assert_eq!(parsed.stats.items_emitted, 1);
}

#[test]
fn parse_source_emits_single_salmon_item_and_skips_section_rows() {
    let parser = RowParser::new().expect("parser");
    let content = csv_document(
        FOOD_HEADER,
        &[data_row("Beverages", "10"), data_row("Salmon, raw", "180")],
    );

    let parsed = parser
        .parse_source(&content, SourceKind::Food)
        .expect("parsed");
    let (catalog, counts) = merge_sources(parsed.items, Vec::new());

    assert_eq!(
        catalog,
        vec![FoodItem {
            name: "Salmon".to_string(),
            purines: Some(180),
            category: Category::Seafood,
            purine_level: PurineLevel::Medium,
        }]
    );
    assert_eq!(counts.unique_items, 1);
    assert_eq!(parsed.stats.skipped_section_headers, 1);
}

#[test]
fn parse_source_skips_footnotes_inside_data_region() {
    let parser = RowParser::new().expect("parser");
    let content = csv_document(
        FOOD_HEADER,
        &[
            data_row("Tofu", "68"),
            data_row("Sources of data: see reference list", "50"),
            "2 Value calculated from a composite sample".to_string(),
            data_row("Tempeh", "92"),
        ],
    );

    let parsed = parser
        .parse_source(&content, SourceKind::Food)
        .expect("parsed");
    let names: Vec<&str> = parsed.items.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, vec!["Tofu", "Tempeh"]);
    // Two footnotes plus the blank line and the "ND =" legend after the rows.
    assert_eq!(parsed.stats.skipped_noise_lines, 4);
    assert_eq!(parsed.stats.items_emitted, 2);
}

#[test]
fn parse_source_drops_truncated_rows() {
    let parser = RowParser::new().expect("parser");
    let content = csv_document(
        FOOD_HEADER,
        &["\"Tuna, raw\",1,2,3,157".to_string(), data_row("Tuna, raw", "157")],
    );

    let parsed = parser
        .parse_source(&content, SourceKind::Food)
        .expect("parsed");
    assert_eq!(parsed.items.len(), 1);
    assert_eq!(parsed.stats.skipped_short_rows, 1);
}

#[test]
fn parse_source_requires_header_for_its_kind() {
    let parser = RowParser::new().expect("parser");
    let content = csv_document(FOOD_HEADER, &[data_row("Beer", "10")]);

    let err = parser
        .parse_source(&content, SourceKind::Alcohol)
        .expect_err("food header in alcohol file");
    assert!(matches!(
        err,
        IngestError::HeaderNotFound {
            kind: SourceKind::Alcohol,
            ..
        }
    ));
}

#[test]
fn merge_sources_prefers_food_rows_on_equal_names() {
    let food = vec![FoodItem::measured("Sake".to_string(), 2, Category::Other)];
    let alcohol = vec![
        FoodItem::measured("Sake".to_string(), 3, Category::Beverages),
        FoodItem::measured("Beer".to_string(), 10, Category::Beverages),
    ];

    let (catalog, counts) = merge_sources(food, alcohol);
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog[0].name, "Beer");
    assert_eq!(catalog[1].category, Category::Other);
    assert_eq!(counts.total_items, 3);
    assert_eq!(counts.duplicates_dropped, 1);
}

#[test]
fn build_catalog_reads_latest_snapshot_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_snapshot(
        dir.path(),
        "2023-01-01",
        &[data_row("Old anchovy, raw", "300")],
        &[data_row("Old beer", "10")],
    );
    write_snapshot(
        dir.path(),
        "2024-05-05",
        &[data_row("Tofu", "68.5"), data_row("tofu", "70")],
        &[data_row("Beer, regular", "14.2")],
    );

    let build = build_catalog(&FsListing, dir.path()).expect("catalog built");
    assert_eq!(build.sources.folder_name, "2024-05-05");

    let names: Vec<&str> = build.catalog.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, vec!["Beer, Regular", "Tofu"]);
    assert_eq!(build.catalog[0].category, Category::Beverages);
    assert_eq!(build.catalog[1].purines, Some(69));
    assert_eq!(build.counts.duplicates_dropped, 1);
}

#[test]
fn build_catalog_rejects_alcohol_file_without_header() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_snapshot(dir.path(), "2024-05-05", &[data_row("Tofu", "68")], &[]);
    fs::write(
        dir.path().join("2024-05-05").join("purine_alcohol.csv"),
        "no header here\n",
    )
    .expect("overwrite alcohol csv");

    let err = build_catalog(&FsListing, dir.path()).expect_err("header missing");
    assert!(matches!(
        err.downcast_ref::<IngestError>(),
        Some(IngestError::HeaderNotFound { .. })
    ));
}

#[test]
fn ingest_run_is_byte_identical_across_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_root = dir.path().join("data");
    write_snapshot(
        &data_root,
        "2024-05-05",
        &[
            data_row("Salmon, raw", "180"),
            data_row("Chicken, liver, raw6", "312.9"),
            data_row("'Bacon', meatless", "12"),
        ],
        &[data_row("Beer, regular", "14.2"), data_row("Sake", "1.2")],
    );

    let mut outputs = Vec::new();
    for attempt in 0..2 {
        let output = dir.path().join(format!("catalog_{attempt}.json"));
        let manifest_path = dir.path().join(format!("manifest_{attempt}.json"));
        run(IngestArgs {
            data_root: data_root.clone(),
            output: output.clone(),
            manifest_path: Some(manifest_path.clone()),
            dry_run: false,
        })
        .expect("ingest run");
        let manifest: IngestRunManifest =
            serde_json::from_slice(&fs::read(&manifest_path).expect("read manifest"))
                .expect("parse manifest");
        assert_eq!(manifest.source_folder, "2024-05-05");
        assert_eq!(manifest.sources.len(), 2);
        assert_eq!(manifest.sources[0].rows.items_emitted, 3);
        assert_eq!(manifest.counts.total_items, 5);
        assert_eq!(manifest.counts.unique_items, 5);
        outputs.push(fs::read(&output).expect("read catalog"));
    }

    assert_eq!(outputs[0], outputs[1]);

    let catalog = load_catalog(&dir.path().join("catalog_0.json")).expect("load catalog");
    assert_eq!(catalog.len(), 5);
    assert!(catalog.iter().any(|item| item.name == "Bacon (Meatless)"));
    assert!(
        catalog
            .iter()
            .any(|item| item.name == "Chicken, Liver" && item.purine_level == PurineLevel::VeryHigh)
    );
}

#[test]
fn ingest_dry_run_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_root = dir.path().join("data");
    write_snapshot(&data_root, "2024-05-05", &[data_row("Tofu", "68")], &[]);
    let output = dir.path().join("catalog.json");

    run(IngestArgs {
        data_root,
        output: output.clone(),
        manifest_path: None,
        dry_run: true,
    })
    .expect("dry run");
    assert!(!output.exists());
}
