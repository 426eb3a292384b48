//! Relational views over the visa graph.
//!
//! The graph is a sparse set of directed edges `origin → destination` between
//! canonical country keys. A missing edge is a different fact from an edge
//! whose requirement text could not be classified: the first surfaces as
//! [`Lookup::NotAvailable`], the second as a found edge with
//! [`Requirement::Unknown`].

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::records::{Passport, VisaRule};
use crate::registry::CodeRegistry;
use crate::types::{normalize_code, Requirement};

/// A classified visa edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisaEdge {
    #[serde(rename = "class")]
    pub requirement: Requirement,
    #[serde(flatten)]
    pub rule: VisaRule,
}

/// A source edge that could not be placed in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedEdge {
    pub origin: String,
    pub destination: String,
}

/// Result of looking up one directed edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Lookup {
    Found(VisaEdge),
    /// No edge recorded for this direction.
    NotAvailable,
}

impl Lookup {
    pub fn is_favorable(&self) -> bool {
        match self {
            Lookup::Found(edge) => edge.requirement.is_favorable(),
            Lookup::NotAvailable => false,
        }
    }
}

/// Both directions between two countries, each resolved on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reciprocal {
    pub first: String,
    pub second: String,
    /// Requirement for holders of `first` travelling to `second`.
    pub forward: Lookup,
    /// Requirement for holders of `second` travelling to `first`.
    pub backward: Lookup,
}

/// One row of the passport ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankEntry {
    pub rank: usize,
    pub key: String,
    pub favorable_count: usize,
}

/// Directed visa requirement graph over canonical keys.
#[derive(Debug, Clone, Default)]
pub struct VisaGraph {
    edges: BTreeMap<String, BTreeMap<String, VisaEdge>>,
}

impl VisaGraph {
    /// Build the graph from passport records.
    ///
    /// Origins and destinations are resolved through `registry`. Edges whose
    /// endpoints do not resolve are dropped and returned; self-edges are
    /// skipped silently.
    pub fn build(passports: &[Passport], registry: &CodeRegistry) -> (Self, Vec<DroppedEdge>) {
        let mut edges: BTreeMap<String, BTreeMap<String, VisaEdge>> = BTreeMap::new();
        let mut dropped = Vec::new();

        for passport in passports {
            let Some(origin) = registry.resolve(&passport.code) else {
                log::warn!("passport {} does not resolve to a country key", passport.code);
                dropped.extend(passport.requirements.keys().map(|dest| DroppedEdge {
                    origin: normalize_code(&passport.code),
                    destination: normalize_code(dest),
                }));
                continue;
            };

            let row = edges.entry(origin.to_string()).or_default();
            for (dest, rule) in &passport.requirements {
                let Some(destination) = registry.resolve(dest) else {
                    log::warn!("visa edge {} -> {} has an unknown destination", origin, dest);
                    dropped.push(DroppedEdge {
                        origin: origin.to_string(),
                        destination: normalize_code(dest),
                    });
                    continue;
                };
                if destination == origin {
                    continue;
                }
                let edge = VisaEdge {
                    requirement: Requirement::classify(&rule.requirement),
                    rule: rule.clone(),
                };
                if row.insert(destination.to_string(), edge).is_some() {
                    log::warn!(
                        "visa edge {} -> {} defined more than once, keeping the last",
                        origin,
                        destination
                    );
                }
            }
        }

        (Self { edges }, dropped)
    }

    /// Whether `origin` has any visa data at all.
    pub fn has_origin(&self, origin: &str) -> bool {
        self.edges.contains_key(origin)
    }

    /// Origins with visa data, ascending.
    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// Number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum()
    }

    /// Every edge leaving `origin`, by destination ascending.
    pub fn edges_from(&self, origin: &str) -> impl Iterator<Item = (&str, &VisaEdge)> {
        self.edges
            .get(origin)
            .into_iter()
            .flat_map(|row| row.iter().map(|(dest, edge)| (dest.as_str(), edge)))
    }

    /// Look up the single directed edge `origin → destination`.
    pub fn lookup(&self, origin: &str, destination: &str) -> Lookup {
        self.edges
            .get(origin)
            .and_then(|row| row.get(destination))
            .map_or(Lookup::NotAvailable, |edge| Lookup::Found(edge.clone()))
    }

    /// Both directions between `a` and `b`, with no inference between them.
    pub fn reciprocal(&self, a: &str, b: &str) -> Reciprocal {
        Reciprocal {
            first: a.to_string(),
            second: b.to_string(),
            forward: self.lookup(a, b),
            backward: self.lookup(b, a),
        }
    }

    /// Destinations `origin` reaches favorably, ascending.
    pub fn favorable_from(&self, origin: &str) -> Vec<&str> {
        self.edges_from(origin)
            .filter(|(_, edge)| edge.requirement.is_favorable())
            .map(|(dest, _)| dest)
            .collect()
    }

    /// Destinations favorable to every one of `origins`, ascending.
    ///
    /// Each destination is counted once per distinct origin that classifies
    /// it as favorable and kept only when the count equals the number of
    /// distinct origins. A single origin yields all of its favorable
    /// destinations; no origins yield nothing.
    pub fn common_favorable(&self, origins: &[&str]) -> Vec<String> {
        let distinct: BTreeSet<&str> = origins.iter().copied().collect();
        if distinct.is_empty() {
            return Vec::new();
        }

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for origin in &distinct {
            for dest in self.favorable_from(origin) {
                *counts.entry(dest).or_insert(0) += 1;
            }
        }

        counts
            .into_iter()
            .filter(|(_, count)| *count == distinct.len())
            .map(|(dest, _)| dest.to_string())
            .collect()
    }

    /// Rank every origin by favorable-destination count.
    ///
    /// Sorted by count descending, then key ascending. Ranks use standard
    /// competition ranking: tied counts share a rank and the next distinct
    /// count is ranked by its position (1, 2, 2, 4).
    pub fn rank(&self) -> Vec<RankEntry> {
        let mut ordered: Vec<(&str, usize)> = self
            .origins()
            .map(|origin| (origin, self.favorable_from(origin).len()))
            .collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let mut entries: Vec<RankEntry> = Vec::with_capacity(ordered.len());
        for (position, (key, count)) in ordered.into_iter().enumerate() {
            let rank = match entries.last() {
                Some(prev) if prev.favorable_count == count => prev.rank,
                _ => position + 1,
            };
            entries.push(RankEntry {
                rank,
                key: key.to_string(),
                favorable_count: count,
            });
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn registry() -> CodeRegistry {
        let mut registry = CodeRegistry::new("countries");
        for (key, alpha2) in [
            ("USA", "US"),
            ("CAN", "CA"),
            ("GBR", "GB"),
            ("MEX", "MX"),
            ("FRA", "FR"),
            ("CHN", "CN"),
        ] {
            registry.register(key, [alpha2]);
        }
        registry
    }

    fn graph() -> VisaGraph {
        let passports = vec![
            passport(
                "USA",
                &[
                    ("CAN", "visa free"),
                    ("MEX", "180"),
                    ("FRA", "90 days"),
                    ("CHN", "visa required"),
                    ("USA", "-1"),
                ],
            ),
            passport("CAN", &[("US", "visa not required"), ("MEX", "eta")]),
            passport("GBR", &[("MEX", "visa on arrival"), ("FRA", "e-visa")]),
        ];
        let (graph, dropped) = VisaGraph::build(&passports, &registry());
        assert!(dropped.is_empty());
        graph
    }

    #[test]
    fn build_resolves_alternate_destination_codes() {
        let graph = graph();
        assert!(matches!(graph.lookup("CAN", "USA"), Lookup::Found(_)));
    }

    #[test]
    fn build_skips_self_edges() {
        let graph = graph();
        assert_eq!(graph.lookup("USA", "USA"), Lookup::NotAvailable);
        assert_eq!(graph.edge_count(), 8);
    }

    #[test]
    fn build_drops_unknown_destinations() {
        let passports = vec![passport("USA", &[("XXX", "visa free"), ("CAN", "visa free")])];
        let (graph, dropped) = VisaGraph::build(&passports, &registry());
        assert_eq!(
            dropped,
            vec![DroppedEdge {
                origin: "USA".into(),
                destination: "XXX".into(),
            }]
        );
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn build_drops_unknown_origins() {
        let passports = vec![passport("ZZZ", &[("CAN", "visa free")])];
        let (graph, dropped) = VisaGraph::build(&passports, &registry());
        assert_eq!(dropped.len(), 1);
        assert!(!graph.has_origin("ZZZ"));
    }

    #[test]
    fn reciprocal_directions_are_independent() {
        let graph = graph();
        let result = graph.reciprocal("USA", "CHN");
        assert!(!result.forward.is_favorable());
        assert!(matches!(
            result.forward,
            Lookup::Found(VisaEdge {
                requirement: Requirement::VisaRequired,
                ..
            })
        ));
        // No CHN passport data: absent, not "required".
        assert_eq!(result.backward, Lookup::NotAvailable);

        let result = graph.reciprocal("USA", "FRA");
        assert!(result.forward.is_favorable());
        assert_eq!(result.backward, Lookup::NotAvailable);
    }

    #[test]
    fn common_favorable_scenario() {
        let graph = graph();
        assert_eq!(graph.common_favorable(&["USA", "CAN"]), vec!["MEX"]);
        assert_eq!(graph.common_favorable(&["USA", "CAN", "GBR"]), vec!["MEX"]);
        assert!(graph.common_favorable(&["USA", "CHN"]).is_empty());
    }

    #[test]
    fn common_favorable_single_origin() {
        let graph = graph();
        assert_eq!(
            graph.common_favorable(&["USA"]),
            vec!["CAN", "FRA", "MEX"]
        );
    }

    #[test]
    fn common_favorable_ignores_duplicate_origins() {
        let graph = graph();
        assert_eq!(graph.common_favorable(&["GBR", "GBR"]), vec!["FRA", "MEX"]);
        assert!(graph.common_favorable(&[]).is_empty());
    }

    #[test]
    fn rank_scenario() {
        let graph = graph();
        let ranking = graph.rank();
        let rows: Vec<(usize, &str, usize)> = ranking
            .iter()
            .map(|e| (e.rank, e.key.as_str(), e.favorable_count))
            .collect();
        assert_eq!(rows, vec![(1, "USA", 3), (2, "CAN", 2), (2, "GBR", 2)]);
    }

    #[test]
    fn rank_skips_positions_after_ties() {
        let passports = vec![
            passport("USA", &[("CAN", "visa free"), ("MEX", "visa free")]),
            passport("CAN", &[("USA", "visa free"), ("MEX", "visa free")]),
            passport("MEX", &[("USA", "visa free")]),
            passport("FRA", &[("USA", "visa required")]),
        ];
        let (graph, _) = VisaGraph::build(&passports, &registry());
        let ranks: Vec<(usize, String)> = graph.rank().into_iter().map(|e| (e.rank, e.key)).collect();
        assert_eq!(
            ranks,
            vec![
                (1, "CAN".to_string()),
                (1, "USA".to_string()),
                (3, "MEX".to_string()),
                (4, "FRA".to_string()),
            ]
        );
    }

    #[test]
    fn lookup_serializes_with_status_tag() {
        let graph = graph();
        let found = serde_json::to_value(graph.lookup("USA", "MEX")).unwrap();
        assert_eq!(found["status"], "found");
        assert_eq!(found["class"], "visa_free");
        assert_eq!(found["requirement"], "180");

        let missing = serde_json::to_value(graph.lookup("MEX", "USA")).unwrap();
        assert_eq!(missing, serde_json::json!({ "status": "not_available" }));
    }
}
