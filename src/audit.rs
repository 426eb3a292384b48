//! Dataset audit - data-quality findings over a built snapshot.
//!
//! Reports:
//! - codes bound to more than one canonical key
//! - visa edges whose endpoints do not resolve
//! - requirement text the classifier cannot place
//! - passports with no country record, and duplicated records

use std::collections::BTreeMap;

use serde::Serialize;

use crate::atlas::Atlas;
use crate::records::Record;
use crate::types::Requirement;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single audit finding.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    /// Key or edge the finding is about (e.g. "USA" or "USA -> XKX").
    pub subject: String,
    pub message: String,
}

/// Aggregated audit output.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub countries: usize,
    pub passports: usize,
    pub airports: usize,
    /// Distinct country codes the registry resolves.
    pub codes: usize,
    pub errors: usize,
    pub warnings: usize,
    /// Classified edge counts, by requirement class.
    pub classes: BTreeMap<Requirement, usize>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AuditReport {
    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }

    /// Returns true if there are no findings at all.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Audit a snapshot.
pub fn audit(atlas: &Atlas) -> AuditReport {
    let mut diagnostics = Vec::new();
    let report = atlas.report();

    for collision in &report.collisions {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            code: "code-collision",
            subject: collision.code.clone(),
            message: format!(
                "code {} bound to {} and then {}; {} wins",
                collision.code, collision.previous, collision.current, collision.current
            ),
        });
    }

    for key in &report.duplicate_keys {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            code: "duplicate-record",
            subject: key.clone(),
            message: format!("more than one record uses key {}; the last one is kept", key),
        });
    }

    for edge in &report.dropped_edges {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            code: "unresolved-edge",
            subject: format!("{} -> {}", edge.origin, edge.destination),
            message: "visa edge endpoint does not resolve to a known country".to_string(),
        });
    }

    for passport in atlas.passports() {
        if atlas.country(passport.key()).is_err() {
            diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                code: "missing-country",
                subject: passport.key().to_string(),
                message: format!("passport {} has no country record", passport.name),
            });
        }
    }

    let graph = atlas.visa_graph();
    let mut classes: BTreeMap<Requirement, usize> = BTreeMap::new();
    for origin in graph.origins() {
        for (dest, edge) in graph.edges_from(origin) {
            *classes.entry(edge.requirement).or_insert(0) += 1;
            if edge.requirement == Requirement::Unknown {
                diagnostics.push(Diagnostic {
                    severity: Severity::Warning,
                    code: "unclassified-requirement",
                    subject: format!("{} -> {}", origin, dest),
                    message: format!(
                        "requirement \"{}\" matches no classification rule",
                        edge.rule.requirement
                    ),
                });
            }
        }
    }

    if atlas.countries().is_empty() {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            code: "empty-dataset",
            subject: "countries".to_string(),
            message: "country dataset has no records".to_string(),
        });
    }
    if atlas.passports().is_empty() {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            code: "empty-dataset",
            subject: "passports".to_string(),
            message: "passport dataset has no records".to_string(),
        });
    }

    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warnings = diagnostics.len() - errors;

    AuditReport {
        countries: atlas.countries().len(),
        passports: atlas.passports().len(),
        airports: atlas.airports().len(),
        codes: atlas.registry().len(),
        errors,
        warnings,
        classes,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Country, Passport, VisaRule};
    use serde_json::json;

    fn country(cca3: &str, cca2: &str) -> Country {
        serde_json::from_value(json!({
            "name": { "common": cca3 },
            "cca2": cca2,
            "cca3": cca3
        }))
        .unwrap()
    }

    fn passport(code: &str, rules: &[(&str, &str)]) -> Passport {
        Passport {
            code: code.to_string(),
            alpha2: None,
            name: code.to_string(),
            requirements: rules
                .iter()
                .map(|(dest, req)| (dest.to_string(), VisaRule::new(*req)))
                .collect(),
        }
    }

    fn codes(report: &AuditReport) -> Vec<&'static str> {
        report.diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn clean_snapshot() {
        let atlas = Atlas::new(
            vec![country("USA", "US"), country("CAN", "CA")],
            vec![passport("USA", &[("CAN", "visa free")])],
            vec![],
        );
        let report = audit(&atlas);
        assert!(report.is_clean());
        assert!(report.is_ok());
        assert_eq!(report.codes, 4);
        assert_eq!(report.classes[&Requirement::VisaFree], 1);
    }

    #[test]
    fn reports_unclassified_requirement() {
        let atlas = Atlas::new(
            vec![country("USA", "US"), country("CAN", "CA")],
            vec![passport("USA", &[("CAN", "ask at the border")])],
            vec![],
        );
        let report = audit(&atlas);
        assert_eq!(codes(&report), vec!["unclassified-requirement"]);
        assert_eq!(report.diagnostics[0].subject, "USA -> CAN");
        assert_eq!(report.warnings, 1);
        assert!(report.is_ok());
    }

    #[test]
    fn reports_collisions_and_unresolved_edges() {
        let atlas = Atlas::new(
            vec![country("USA", "US"), country("UMI", "US")],
            vec![passport("USA", &[("XXX", "visa free")])],
            vec![],
        );
        let report = audit(&atlas);
        assert_eq!(codes(&report), vec!["code-collision", "unresolved-edge"]);
    }

    #[test]
    fn reports_passport_without_country() {
        let mut passport = passport("XKX", &[]);
        passport.alpha2 = Some("XK".into());
        let atlas = Atlas::new(vec![country("USA", "US")], vec![passport], vec![]);
        let report = audit(&atlas);
        assert_eq!(codes(&report), vec!["missing-country"]);
    }

    #[test]
    fn empty_datasets_are_errors() {
        let atlas = Atlas::new(vec![], vec![], vec![]);
        let report = audit(&atlas);
        assert_eq!(report.errors, 2);
        assert!(!report.is_ok());
    }

    #[test]
    fn report_serializes_classes_by_name() {
        let atlas = Atlas::new(
            vec![country("USA", "US"), country("CAN", "CA")],
            vec![passport("USA", &[("CAN", "e-visa")])],
            vec![],
        );
        let value = serde_json::to_value(audit(&atlas)).unwrap();
        assert_eq!(value["classes"]["electronic_visa"], 1);
        assert_eq!(value["diagnostics"], json!([]));
    }
}
