mod classify;
mod csv_line;
mod names;
mod rows;
mod run;
mod sources;
#[cfg(test)]
mod tests;

pub use run::run;
pub use sources::{DirectoryListing, FsListing, SnapshotLocator};
