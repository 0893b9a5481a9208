//! Worksheet data sources.
//!
//! In the dashboard the extension front-end reads summary data from the host
//! and posts it with the request; the CLI reads the same shape from a file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use tableau_provisioner_core::DataTable;

/// Errors reading worksheet data.
#[derive(Debug, Error)]
pub enum RowSourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid worksheet data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("worksheet file not found: {0}")]
    NotFound(String),
}

/// Named worksheets with tabular summary data.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Names of every worksheet available.
    async fn worksheet_names(&self) -> Result<Vec<String>, RowSourceError>;

    /// Summary data of one worksheet, `None` if no worksheet has that name.
    async fn summary_data(&self, name: &str) -> Result<Option<DataTable>, RowSourceError>;
}

/// Worksheets supplied up front.
#[derive(Debug, Clone, Default)]
pub struct InlineRowSource {
    worksheets: Vec<DataTable>,
}

impl InlineRowSource {
    #[must_use]
    pub const fn new(worksheets: Vec<DataTable>) -> Self {
        Self { worksheets }
    }

    fn find(&self, name: &str) -> Option<&DataTable> {
        self.worksheets.iter().find(|sheet| sheet.name == name)
    }
}

#[async_trait]
impl RowSource for InlineRowSource {
    async fn worksheet_names(&self) -> Result<Vec<String>, RowSourceError> {
        Ok(self.worksheets.iter().map(|sheet| sheet.name.clone()).collect())
    }

    async fn summary_data(&self, name: &str) -> Result<Option<DataTable>, RowSourceError> {
        Ok(self.find(name).cloned())
    }
}

/// Accepted layouts of a worksheet file.
#[derive(Deserialize)]
#[serde(untagged)]
enum WorksheetFile {
    Many(Vec<DataTable>),
    Wrapped { worksheets: Vec<DataTable> },
    One(DataTable),
}

impl From<WorksheetFile> for Vec<DataTable> {
    fn from(file: WorksheetFile) -> Self {
        match file {
            WorksheetFile::Many(sheets) | WorksheetFile::Wrapped { worksheets: sheets } => sheets,
            WorksheetFile::One(sheet) => vec![sheet],
        }
    }
}

/// Worksheets read from a JSON file on every call.
///
/// The file holds a single table, an array of tables, or
/// `{"worksheets": [...]}` as posted to the HTTP API.
#[derive(Debug, Clone)]
pub struct JsonFileRowSource {
    path: PathBuf,
}

impl JsonFileRowSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<InlineRowSource, RowSourceError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RowSourceError::NotFound(self.path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let file: WorksheetFile = serde_json::from_str(&text)?;
        Ok(InlineRowSource::new(file.into()))
    }
}

#[async_trait]
impl RowSource for JsonFileRowSource {
    async fn worksheet_names(&self) -> Result<Vec<String>, RowSourceError> {
        self.load().await?.worksheet_names().await
    }

    async fn summary_data(&self, name: &str) -> Result<Option<DataTable>, RowSourceError> {
        Ok(self.load().await?.find(name).cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn temp_file(name: &str, contents: &serde_json::Value) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "tp-row-source-{}-{name}.json",
            std::process::id()
        ));
        std::fs::write(&path, contents.to_string()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_inline_lookup_by_exact_name() {
        let source = InlineRowSource::new(vec![
            DataTable::from_rows("New Hires", &["name"], &[&["ana@example.com"]]),
            DataTable::from_rows("Leavers", &["name"], &[]),
        ]);

        assert_eq!(
            source.worksheet_names().await.unwrap(),
            vec!["New Hires", "Leavers"]
        );
        assert_eq!(
            source
                .summary_data("New Hires")
                .await
                .unwrap()
                .unwrap()
                .data
                .len(),
            1
        );
        assert!(source.summary_data("new hires").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_file_layouts() {
        let sheet = json!({
            "name": "New Hires",
            "columns": [{"fieldName": "name", "index": 0}],
            "data": [[{"value": "ana@example.com"}]]
        });

        for (label, contents) in [
            ("one", sheet.clone()),
            ("many", json!([sheet.clone()])),
            ("wrapped", json!({"worksheets": [sheet.clone()]})),
        ] {
            let path = temp_file(label, &contents);
            let source = JsonFileRowSource::new(&path);
            assert_eq!(
                source.worksheet_names().await.unwrap(),
                vec!["New Hires"],
                "layout {label}"
            );
            std::fs::remove_file(path).unwrap();
        }
    }

    #[tokio::test]
    async fn test_json_file_missing() {
        let source = JsonFileRowSource::new("/nonexistent/tp-worksheets.json");
        assert!(matches!(
            source.worksheet_names().await,
            Err(RowSourceError::NotFound(_))
        ));
    }
}
