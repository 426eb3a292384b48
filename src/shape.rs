//! Dataset shape checking against built-in JSON Schemas.
//!
//! Raw dataset JSON is checked before it is deserialized so a malformed file
//! reports every offending path at once instead of the first serde error.

use serde_json::{json, Value};

use crate::error::{LoadError, ShapeError};

/// The datasets a snapshot is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Countries,
    Passports,
    Airports,
}

impl Dataset {
    pub const ALL: [Dataset; 3] = [Dataset::Countries, Dataset::Passports, Dataset::Airports];

    /// Name used in messages.
    pub fn label(self) -> &'static str {
        match self {
            Dataset::Countries => "countries",
            Dataset::Passports => "passports",
            Dataset::Airports => "airports",
        }
    }

    /// File name inside a data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Dataset::Countries => "countries.json",
            Dataset::Passports => "passports.json",
            Dataset::Airports => "airports.json",
        }
    }

    /// JSON Schema every file of this dataset must satisfy.
    pub fn schema(self) -> Value {
        let item = match self {
            Dataset::Countries => json!({
                "type": "object",
                "required": ["name", "cca3"],
                "properties": {
                    "name": {
                        "type": "object",
                        "required": ["common"],
                        "properties": {
                            "common": { "type": "string" },
                            "official": { "type": "string" },
                            "nativeName": { "type": "object" }
                        }
                    },
                    "cca2": { "type": "string" },
                    "cca3": { "type": "string", "minLength": 1 },
                    "ccn3": { "type": "string" },
                    "cioc": { "type": "string" },
                    "fifa": { "type": "string" },
                    "independent": { "type": ["boolean", "null"] },
                    "unMember": { "type": "boolean" },
                    "capital": { "type": "array", "items": { "type": "string" } },
                    "region": { "type": "string" },
                    "languages": {
                        "type": "object",
                        "additionalProperties": { "type": "string" }
                    },
                    "currencies": {
                        "type": "object",
                        "additionalProperties": {
                            "type": "object",
                            "required": ["name"]
                        }
                    },
                    "borders": { "type": "array", "items": { "type": "string" } },
                    "population": { "type": "integer", "minimum": 0 }
                }
            }),
            Dataset::Passports => json!({
                "type": "object",
                "required": ["code", "name"],
                "properties": {
                    "code": { "type": "string", "minLength": 1 },
                    "alpha2": { "type": "string" },
                    "name": { "type": "string" },
                    "requirements": {
                        "type": "object",
                        "additionalProperties": {
                            "oneOf": [
                                { "type": "string" },
                                { "type": "integer" },
                                {
                                    "type": "object",
                                    "required": ["requirement"],
                                    "properties": {
                                        "requirement": { "type": "string" }
                                    }
                                }
                            ]
                        }
                    }
                }
            }),
            Dataset::Airports => json!({
                "type": "object",
                "required": ["icao", "name", "country"],
                "properties": {
                    "icao": { "type": "string", "minLength": 1 },
                    "iata": { "type": "string" },
                    "name": { "type": "string" },
                    "country": { "type": "string" },
                    "latitude": { "type": "number" },
                    "longitude": { "type": "number" },
                    "elevation": { "type": "integer" }
                }
            }),
        };
        json!({ "type": "array", "items": item })
    }
}

/// Check raw dataset JSON against the dataset's shape.
///
/// # Errors
///
/// Returns `LoadError::InvalidShape` listing every violation.
pub fn check_shape(dataset: Dataset, value: &Value) -> Result<(), LoadError> {
    let errors = shape_errors(dataset, value)?;
    if errors.is_empty() {
        Ok(())
    } else {
        Err(LoadError::InvalidShape {
            dataset: dataset.label(),
            errors,
        })
    }
}

/// Every shape violation in `value`; empty when it conforms.
pub fn shape_errors(dataset: Dataset, value: &Value) -> Result<Vec<ShapeError>, LoadError> {
    let validator =
        jsonschema::validator_for(&dataset.schema()).map_err(|e| LoadError::BadShapeDefinition {
            dataset: dataset.label(),
            message: e.to_string(),
        })?;

    Ok(validator
        .iter_errors(value)
        .map(|e| ShapeError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect())
}
