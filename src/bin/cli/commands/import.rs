use std::path::Path;

use anyhow::{Context, Result};

use quran_study_lib::import::import_file;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, file: &Path, format: &OutputFormat) -> Result<()> {
    let summary = import_file(&app.store, file, &app.config.import)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Plain => {
            println!("Imported {} verses.", summary.imported);
            if summary.skipped_existing > 0 {
                println!("Skipped {} verses already in the database.", summary.skipped_existing);
            }
            if summary.unparsed > 0 {
                println!("{} lines could not be parsed (see log).", summary.unparsed);
            }
        }
    }
    Ok(())
}
