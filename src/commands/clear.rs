use anyhow::Result;
use tracing::info;

use crate::catalog::write_catalog;
use crate::cli::ClearArgs;

pub fn run(args: ClearArgs) -> Result<()> {
    write_catalog(&args.output, &[])?;
    info!(path = %args.output.display(), "cleared catalog");
    Ok(())
}
