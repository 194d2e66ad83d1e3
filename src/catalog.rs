use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::dataset::DatasetId;
use crate::error::{BikeshareError, Result};

/// Maps datasets to the CSV files they are read from.
///
/// By default every dataset lives in `data_dir` under its standard file name.
/// Individual datasets can be pointed elsewhere with a JSON file:
/// ```json
/// {
///   "chicago": "/srv/bikeshare/chicago_2017.csv",
///   "new york city": "nyc/trips.csv"
/// }
/// ```
/// Relative paths are resolved against `data_dir`.
#[derive(Debug, Clone)]
pub struct DatasetCatalog {
    data_dir: PathBuf,
    entries: HashMap<DatasetId, PathBuf>,
}

impl DatasetCatalog {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            entries: HashMap::new(),
        }
    }

    /// Loads overrides from the JSON file at `path` on top of `data_dir`.
    pub fn load(data_dir: impl Into<PathBuf>, path: &Path) -> Result<Self> {
        let catalog_error = |reason: String| BikeshareError::Catalog {
            path: path.to_path_buf(),
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| catalog_error(e.to_string()))?;
        let raw: HashMap<String, String> =
            serde_json::from_str(&content).map_err(|e| catalog_error(e.to_string()))?;

        let mut catalog = Self::new(data_dir);
        for (name, file) in raw {
            let dataset = name.parse::<DatasetId>().map_err(catalog_error)?;
            if catalog.entries.contains_key(&dataset) {
                return Err(catalog_error(format!(
                    "'{name}' names {dataset}, which already has an entry"
                )));
            }
            catalog = catalog.with_entry(dataset, file);
        }
        Ok(catalog)
    }

    pub fn with_entry(mut self, dataset: DatasetId, path: impl Into<PathBuf>) -> Self {
        self.entries.insert(dataset, path.into());
        self
    }

    /// Returns the file `dataset` is read from.
    pub fn resolve(&self, dataset: DatasetId) -> PathBuf {
        match self.entries.get(&dataset) {
            Some(path) => self.data_dir.join(path),
            None => self.data_dir.join(dataset.file_name()),
        }
    }

    /// Iterates over every dataset with its resolved path.
    pub fn iter(&self) -> impl Iterator<Item = (DatasetId, PathBuf)> + '_ {
        DatasetId::ALL
            .into_iter()
            .map(|dataset| (dataset, self.resolve(dataset)))
    }
}
