//! Dataset loading from files, strings and HTTP URLs.
//!
//! A data source is either a local directory or a URL prefix; each dataset
//! lives under it as `<dataset>.json`.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::atlas::Atlas;
use crate::error::LoadError;
use crate::shape::{check_shape, Dataset};

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load JSON from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file isn't valid JSON.
pub fn load_json(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_json_str(&content)
}

/// Load JSON from a string.
pub fn load_json_str(content: &str) -> Result<Value, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

/// Load JSON from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails, returns an
/// error status, or the body isn't valid JSON.
#[cfg(feature = "remote")]
pub fn load_json_url(url: &str) -> Result<Value, LoadError> {
    let network = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network)?;

    client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.json())
        .map_err(network)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load JSON from a file path or URL.
///
/// URL loading requires the `remote` feature.
pub fn load_json_auto(source: &str) -> Result<Value, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_json_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_json(Path::new(source))
    }
}

/// Check `value` against the dataset's shape and deserialize its records.
///
/// # Errors
///
/// `LoadError::InvalidShape` for shape violations, `LoadError::InvalidJson`
/// if deserialization still fails.
pub fn parse_dataset<T: DeserializeOwned>(dataset: Dataset, value: Value) -> Result<Vec<T>, LoadError> {
    check_shape(dataset, &value)?;
    serde_json::from_value(value).map_err(|source| LoadError::InvalidJson { source })
}

/// Location of one dataset under a data source.
pub fn dataset_location(source: &str, dataset: Dataset) -> String {
    if is_url(source) {
        format!("{}/{}", source.trim_end_matches('/'), dataset.file_name())
    } else {
        Path::new(source)
            .join(dataset.file_name())
            .to_string_lossy()
            .into_owned()
    }
}

/// Load and parse one dataset from a data source.
pub fn load_dataset<T: DeserializeOwned>(source: &str, dataset: Dataset) -> Result<Vec<T>, LoadError> {
    let location = dataset_location(source, dataset);
    log::debug!("loading {} from {}", dataset.label(), location);
    parse_dataset(dataset, load_json_auto(&location)?)
}

/// Load every dataset under `source` and build a snapshot.
///
/// Countries and passports are required. A missing airports file (absent
/// locally, or a 404 under a URL prefix) yields an empty airport collection.
pub fn load_atlas(source: &str) -> Result<Atlas, LoadError> {
    let countries = load_dataset(source, Dataset::Countries)?;
    let passports = load_dataset(source, Dataset::Passports)?;
    let airports = match load_dataset(source, Dataset::Airports) {
        Ok(airports) => airports,
        Err(e) if e.is_missing() => {
            log::info!(
                "no airport data at {}, continuing without",
                dataset_location(source, Dataset::Airports)
            );
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    Ok(Atlas::new(countries, passports, airports))
}
