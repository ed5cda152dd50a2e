pub mod data;
pub mod progress;
pub mod report;
pub mod session;
pub mod tasks;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use mastery_common::parse_date;

/// The given `YYYY-MM-DD` day, or today in local time.
pub fn day_or_today(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(date) => parse_date(date)
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", date)),
        None => Ok(Local::now().date_naive()),
    }
}

/// Write `contents` to `output`, or to stdout when no path is given.
pub fn write_output(contents: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("📄 Saved to {}", path.display());
        }
        None => print!("{}", contents),
    }
    Ok(())
}
