//! # CSV Export
//!
//! Writes report rows to `<dir>/<filename>.csv`.

use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use cashbook_core::csv::to_csv;
use cashbook_core::ValidationError;

/// A bare file name: one normal path component, no separators.
fn validate_filename(filename: &str) -> StoreResult<()> {
    let mut components = Path::new(filename).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );

    if !single || filename.contains(['/', '\\']) {
        return Err(StoreError::Core(
            ValidationError::InvalidFormat {
                field: "filename".to_string(),
                reason: format!("'{filename}' must be a plain file name"),
            }
            .into(),
        ));
    }
    Ok(())
}

/// Serializes `rows` to CSV and writes `<dir>/<filename>.csv`.
///
/// Returns the written path, or `None` for an empty collection (no file is
/// created). An existing file with the same name is replaced.
///
/// ## Errors
/// A `filename` with path separators or `..` is rejected before anything is
/// written.
pub fn export_csv<T: Serialize>(rows: &[T], dir: &Path, filename: &str) -> StoreResult<Option<PathBuf>> {
    validate_filename(filename)?;

    let Some(content) = to_csv(rows)? else {
        debug!(filename = %filename, "Nothing to export");
        return Ok(None);
    };

    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{filename}.csv"));
    fs::write(&path, content)?;

    info!(path = %path.display(), rows = rows.len(), "Exported CSV");
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashbook_core::{Money, Product, RecordId};

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![Product {
            id: RecordId::Int(1),
            name: "Tea Leaves \"Kericho\"".to_string(),
            price: Money::from_cents(8550),
            stock_quantity: Some(12),
            category: None,
            created_at: None,
        }];

        let path = export_csv(&rows, dir.path(), "inventory-report").unwrap().unwrap();
        assert_eq!(path.file_name().unwrap(), "inventory-report.csv");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "id,name,price,stock_quantity,category,created_at\n\
             \"1\",\"Tea Leaves \"\"Kericho\"\"\",\"85.5\",\"12\",\"\",\"\""
        );
    }

    #[test]
    fn test_empty_export_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let rows: Vec<Product> = Vec::new();

        assert!(export_csv(&rows, dir.path(), "empty").unwrap().is_none());
        assert!(!dir.path().join("empty.csv").exists());
    }

    #[test]
    fn test_filename_must_stay_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![serde_json::json!({ "name": "Rice 2kg" })];

        for name in ["../escape", "reports/sales", "..", "", "a\\b", "/tmp/abs"] {
            assert!(
                matches!(export_csv(&rows, dir.path(), name), Err(StoreError::Core(_))),
                "{name} was accepted"
            );
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_export_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("reports").join("2026-03");
        let rows = vec![serde_json::json!({ "name": "Rice 2kg" })];

        let path = export_csv(&rows, &nested, "sales").unwrap().unwrap();
        assert!(path.exists());
    }
}
