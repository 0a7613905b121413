use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::warn;

use crate::error::IngestError;
use crate::model::SourceKind;

/// Directory access needed to locate a snapshot. `FsListing` backs the CLI;
/// tests supply an in-memory listing.
pub trait DirectoryListing {
    fn list_subdirectories(&self, root: &Path) -> Result<Vec<String>>;
    fn list_files(&self, folder: &Path) -> Result<Vec<String>>;
}

pub struct FsListing;

impl DirectoryListing for FsListing {
    fn list_subdirectories(&self, root: &Path) -> Result<Vec<String>> {
        list_entries(root, |file_type| file_type.is_dir())
    }

    fn list_files(&self, folder: &Path) -> Result<Vec<String>> {
        list_entries(folder, |file_type| file_type.is_file())
    }
}

fn list_entries(dir: &Path, keep: impl Fn(&fs::FileType) -> bool) -> Result<Vec<String>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to stat {}", entry.path().display()))?;
        if !keep(&file_type) {
            continue;
        }
        // Non UTF-8 names can never match the dated or csv patterns.
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }

    names.sort();
    Ok(names)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFiles {
    pub folder_name: String,
    pub folder: PathBuf,
    pub food: PathBuf,
    pub alcohol: PathBuf,
}

pub struct SnapshotLocator {
    dated_folder: Regex,
}

impl SnapshotLocator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dated_folder: Regex::new(r"^\d{4}-\d{2}-\d{2}$")
                .context("failed to compile dated folder regex")?,
        })
    }

    pub fn is_dated_folder(&self, name: &str) -> bool {
        self.dated_folder.is_match(name)
    }

    /// Greatest dated name by string order; zero-padded ISO dates make that
    /// the most recent one.
    pub fn select_latest<'a, I>(&self, names: I) -> Option<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter(|name| self.is_dated_folder(name))
            .max()
            .map(ToOwned::to_owned)
    }

    pub fn locate(&self, listing: &dyn DirectoryListing, root: &Path) -> Result<SourceFiles> {
        let folders = listing.list_subdirectories(root)?;
        let folder_name = self
            .select_latest(folders.iter().map(String::as_str))
            .ok_or_else(|| IngestError::NoDataFound {
                root: root.to_path_buf(),
            })?;

        let folder = root.join(&folder_name);
        let files = listing.list_files(&folder)?;

        let food = find_source_file(&files, SourceKind::Food, &folder)?;
        let alcohol = find_source_file(&files, SourceKind::Alcohol, &folder)?;

        Ok(SourceFiles {
            food: folder.join(food),
            alcohol: folder.join(alcohol),
            folder_name,
            folder,
        })
    }
}

fn find_source_file<'a>(
    files: &'a [String],
    kind: SourceKind,
    folder: &Path,
) -> Result<&'a str, IngestError> {
    let mut matches: Vec<&str> = files
        .iter()
        .map(String::as_str)
        .filter(|name| name.contains(kind.as_str()) && name.ends_with(".csv"))
        .collect();
    matches.sort_unstable();

    match matches.as_slice() {
        [] => Err(IngestError::MissingSourceFile {
            kind,
            folder: folder.to_path_buf(),
        }),
        [only] => Ok(*only),
        [first, rest @ ..] => {
            warn!(
                kind = %kind,
                folder = %folder.display(),
                using = %first,
                ignored = rest.len(),
                "multiple source files match; using the first"
            );
            Ok(*first)
        }
    }
}
