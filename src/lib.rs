//! Atlas Query
//!
//! Code resolution and cross-dataset queries over country, passport/visa and
//! airport reference data.
//!
//! Datasets are loaded once into an immutable [`Atlas`] snapshot. Every query
//! after that is a pure read: resolve any country identifier to its canonical
//! key, filter records by named predicates, project fields by dotted path,
//! and answer relational visa questions across passports.
//!
//! # Example
//!
//! ```
//! use atlas_query::{project, Atlas, Country, Passport};
//! use serde_json::json;
//!
//! let countries: Vec<Country> = serde_json::from_value(json!([
//!     { "name": { "common": "Canada" }, "cca2": "CA", "cca3": "CAN", "region": "Americas" },
//!     { "name": { "common": "Mexico" }, "cca2": "MX", "cca3": "MEX", "region": "Americas" }
//! ]))
//! .unwrap();
//! let passports: Vec<Passport> = serde_json::from_value(json!([
//!     { "code": "CAN", "name": "Canada", "requirements": { "MX": "visa free" } }
//! ]))
//! .unwrap();
//!
//! let atlas = Atlas::new(countries, passports, vec![]);
//!
//! assert_eq!(atlas.resolve("mx").unwrap(), "MEX");
//! assert!(atlas.reciprocal("CA", "MX").unwrap().forward.is_favorable());
//!
//! let americas = atlas.filter_countries([("region", "americas")]).unwrap();
//! let projected = project(americas[0], &["name.common"]);
//! assert_eq!(projected["name"]["common"], "Canada");
//! ```
//!
//! # Requirement classes
//!
//! | Class | Favorable | Typical wording |
//! |-------|-----------|-----------------|
//! | `visa_free` | yes | "visa not required", "visa free", "90 days" |
//! | `on_arrival` | yes | "visa on arrival", "eTA" |
//! | `electronic_visa` | yes | "e-visa", "eVisa" |
//! | `visa_required` | no | "visa required" |
//! | `no_admission` | no | "no admission" |
//! | `unknown` | no | anything else |
//!
//! A missing visa edge is never a class: it is reported as
//! [`Lookup::NotAvailable`].

mod atlas;
mod audit;
mod error;
mod filter;
mod loader;
mod project;
mod records;
mod registry;
mod relations;
mod shape;
mod shared;
mod types;

pub use atlas::{Atlas, BuildReport, CommonDestinations};
pub use audit::{audit, AuditReport, Diagnostic, Severity};
pub use error::{LoadError, QueryError, ShapeError};
pub use filter::{filter, satisfies, Filterable, Matcher, PredicateDef, Probe};
pub use loader::{
    dataset_location, is_url, load_atlas, load_dataset, load_json, load_json_auto, load_json_str,
    parse_dataset,
};
pub use project::{project, project_all, FieldView};
pub use records::{
    Airport, Country, CountryName, Currency, Flags, Passport, Record, Translation, VisaRule,
};
pub use registry::{CodeRegistry, Collision};
pub use relations::{DroppedEdge, Lookup, RankEntry, Reciprocal, VisaEdge, VisaGraph};
pub use shape::{check_shape, shape_errors, Dataset};
pub use shared::SharedAtlas;
pub use types::{Page, Requirement};

#[cfg(feature = "remote")]
pub use loader::load_json_url;
