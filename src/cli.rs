use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::model::PurineLevel;

#[derive(Parser, Debug)]
#[command(
    name = "purinedb",
    version,
    about = "Build and query the purine food catalog from USDA CSV exports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Ingest(IngestArgs),
    Clear(ClearArgs),
    Search(SearchArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    #[arg(long, default_value = "data")]
    pub data_root: PathBuf,

    #[arg(long, default_value = "data/catalog.json")]
    pub output: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ClearArgs {
    #[arg(long, default_value = "data/catalog.json")]
    pub output: PathBuf,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum LevelFilter {
    All,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl LevelFilter {
    /// `high` also admits `Very High`, matching how the food list tabs filter.
    pub fn admits(self, level: PurineLevel) -> bool {
        match self {
            Self::All => true,
            Self::Low => level == PurineLevel::Low,
            Self::Medium => level == PurineLevel::Medium,
            Self::High => matches!(level, PurineLevel::High | PurineLevel::VeryHigh),
            Self::VeryHigh => level == PurineLevel::VeryHigh,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[arg(long, default_value = "data/catalog.json")]
    pub catalog: PathBuf,

    #[arg(long, default_value = "")]
    pub query: String,

    #[arg(long, value_enum, default_value_t = LevelFilter::All)]
    pub level: LevelFilter,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub limit: Option<usize>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "data/catalog.json")]
    pub catalog: PathBuf,

    #[arg(long, default_value = "data")]
    pub data_root: PathBuf,
}
