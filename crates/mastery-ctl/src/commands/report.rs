use std::path::PathBuf;

use anyhow::{anyhow, Result};
use mastery_db::KvBackend;
use mastery_tracker::{ReportKind, ReportOrder, Tracker};

use super::{day_or_today, write_output};

pub async fn generate<B: KvBackend>(
    tracker: &Tracker<B>,
    kind: &str,
    date: Option<&str>,
    natural: bool,
    output: Option<PathBuf>,
    print: bool,
) -> Result<()> {
    let kind: ReportKind = kind.parse().map_err(|e: String| anyhow!(e))?;
    let today = day_or_today(date)?;
    let order = if natural { ReportOrder::Natural } else { kind.default_order() };

    let report = tracker.reports().generate_ordered(kind, today, order).await?;
    let csv = report.to_csv()?;

    if print {
        return write_output(&csv, None);
    }

    let path = output.unwrap_or_else(|| PathBuf::from(kind.file_name()));
    write_output(&csv, Some(&path))?;
    println!("📊 {} report: {} rows ending {}", kind, report.len(), today);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_report_written_to_file() {
        let tracker = Tracker::in_memory();
        let dir = tempdir().unwrap();
        let path = dir.path().join("category.csv");

        generate(&tracker, "category", Some("2024-01-10"), false, Some(path.clone()), false)
            .await
            .unwrap();

        let csv = std::fs::read_to_string(&path).unwrap();
        assert!(csv.starts_with("name,value,total\n"));
        assert_eq!(csv.lines().count(), 6);
    }

    #[tokio::test]
    async fn test_unknown_report_kind() {
        let tracker = Tracker::in_memory();
        assert!(generate(&tracker, "weekly", None, false, None, true).await.is_err());
    }
}
