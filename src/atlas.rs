//! Immutable dataset snapshot.
//!
//! An [`Atlas`] is built once from the loaded record collections and never
//! mutated afterwards. It is `Send + Sync`; share it behind an `Arc` and query
//! from any number of threads, or behind a [`SharedAtlas`] when the data
//! must be reloaded while queries run.
//!
//! [`SharedAtlas`]: crate::SharedAtlas

use std::collections::HashMap;

use serde::Serialize;

use crate::error::QueryError;
use crate::filter::filter;
use crate::records::{Airport, Country, Passport, Record};
use crate::registry::{CodeRegistry, Collision};
use crate::relations::{DroppedEdge, Lookup, RankEntry, Reciprocal, VisaGraph};
use crate::types::normalize_code;

/// Outcome of a common-destination query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonDestinations {
    /// Canonical keys of the origins that took part.
    pub origins: Vec<String>,
    /// Input codes that resolved to nothing and were skipped.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    pub destinations: Vec<String>,
}

/// Data-quality findings collected while building a snapshot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub collisions: Vec<Collision>,
    pub dropped_edges: Vec<DroppedEdge>,
    /// Canonical keys defined by more than one record of the same dataset.
    pub duplicate_keys: Vec<String>,
}

/// Read-only snapshot of every dataset plus the indexes built over them.
#[derive(Debug, Clone)]
pub struct Atlas {
    countries: Vec<Country>,
    passports: Vec<Passport>,
    airports: Vec<Airport>,
    country_index: HashMap<String, usize>,
    passport_index: HashMap<String, usize>,
    airport_index: HashMap<String, usize>,
    codes: CodeRegistry,
    airport_codes: CodeRegistry,
    visas: VisaGraph,
    report: BuildReport,
}

impl Atlas {
    /// Build a snapshot from loaded collections.
    ///
    /// Countries register their codes first, then passports, so a passport
    /// code that disagrees with the country dataset is reported as a
    /// collision. Building never fails; data-quality problems are logged
    /// and kept in [`Atlas::report`].
    pub fn new(countries: Vec<Country>, passports: Vec<Passport>, airports: Vec<Airport>) -> Self {
        let mut report = BuildReport::default();
        let mut codes = CodeRegistry::new("country");
        let mut airport_codes = CodeRegistry::new("airport");

        for country in &countries {
            report
                .collisions
                .extend(codes.register(country.key(), country.alternate_codes()));
        }
        for passport in &passports {
            report
                .collisions
                .extend(codes.register(passport.key(), passport.alternate_codes()));
        }
        for airport in &airports {
            report
                .collisions
                .extend(airport_codes.register(airport.key(), airport.alternate_codes()));
        }

        let country_index = index_by_key("country", &countries, &mut report);
        let passport_index = index_by_key("passport", &passports, &mut report);
        let airport_index = index_by_key("airport", &airports, &mut report);

        let (visas, dropped) = VisaGraph::build(&passports, &codes);
        report.dropped_edges = dropped;

        log::info!(
            "snapshot built: {} countries, {} passports ({} visa edges), {} airports, {} codes",
            countries.len(),
            passports.len(),
            visas.edge_count(),
            airports.len(),
            codes.len() + airport_codes.len()
        );

        Self {
            countries,
            passports,
            airports,
            country_index,
            passport_index,
            airport_index,
            codes,
            airport_codes,
            visas,
            report,
        }
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn passports(&self) -> &[Passport] {
        &self.passports
    }

    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    /// Country code registry.
    pub fn registry(&self) -> &CodeRegistry {
        &self.codes
    }

    pub fn visa_graph(&self) -> &VisaGraph {
        &self.visas
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Resolve any country code to its canonical key.
    ///
    /// # Errors
    ///
    /// `EmptyArgument` for a blank code, `UnknownCode` for an unregistered one.
    pub fn resolve(&self, code: &str) -> Result<&str, QueryError> {
        if code.trim().is_empty() {
            return Err(QueryError::empty("code"));
        }
        self.codes
            .resolve(code)
            .ok_or_else(|| QueryError::unknown(code))
    }

    /// The country record for any of its codes.
    pub fn country(&self, code: &str) -> Result<&Country, QueryError> {
        let key = self.resolve(code)?;
        lookup(&self.countries, &self.country_index, key, "country")
    }

    /// The passport record for any of its country's codes.
    pub fn passport(&self, code: &str) -> Result<&Passport, QueryError> {
        let key = self.resolve(code)?;
        lookup(&self.passports, &self.passport_index, key, "visa")
    }

    /// The airport for an ICAO or IATA code.
    pub fn airport(&self, code: &str) -> Result<&Airport, QueryError> {
        if code.trim().is_empty() {
            return Err(QueryError::empty("code"));
        }
        let key = self
            .airport_codes
            .resolve(code)
            .ok_or_else(|| QueryError::unknown(code))?;
        lookup(&self.airports, &self.airport_index, key, "airport")
    }

    /// Countries matching every predicate, in dataset order.
    pub fn filter_countries<I, K, V>(&self, predicates: I) -> Result<Vec<&Country>, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        filter(&self.countries, predicates)
    }

    /// Airports matching every predicate, in dataset order.
    pub fn filter_airports<I, K, V>(&self, predicates: I) -> Result<Vec<&Airport>, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        filter(&self.airports, predicates)
    }

    /// Airports located in the country identified by `code`.
    ///
    /// Airport records carry alpha-2 or alpha-3 country codes; both are
    /// resolved through the country registry.
    pub fn airports_in(&self, code: &str) -> Result<Vec<&Airport>, QueryError> {
        let key = self.resolve(code)?;
        Ok(self
            .airports
            .iter()
            .filter(|airport| self.codes.resolve(&airport.country) == Some(key))
            .collect())
    }

    /// Requirement for holders of `from` travelling to `to`.
    pub fn requirement(&self, from: &str, to: &str) -> Result<Lookup, QueryError> {
        let (from, to) = (self.resolve(from)?, self.resolve(to)?);
        Ok(self.visas.lookup(from, to))
    }

    /// Requirements in both directions between two countries.
    ///
    /// Both codes must resolve. A direction with no recorded edge comes back
    /// as [`Lookup::NotAvailable`], never as "visa required".
    pub fn reciprocal(&self, a: &str, b: &str) -> Result<Reciprocal, QueryError> {
        let (a, b) = (self.resolve(a)?, self.resolve(b)?);
        Ok(self.visas.reciprocal(a, b))
    }

    /// Destinations holders of `code` reach favorably, ascending.
    ///
    /// # Errors
    ///
    /// `NoData` when the code is valid but has no passport data.
    pub fn favorable_destinations(&self, code: &str) -> Result<Vec<String>, QueryError> {
        let key = self.resolve(code)?;
        if !self.visas.has_origin(key) {
            return Err(QueryError::NoData {
                key: key.to_string(),
                relation: "visa",
            });
        }
        Ok(self
            .visas
            .favorable_from(key)
            .into_iter()
            .map(String::from)
            .collect())
    }

    /// Destinations favorable to every passport in `codes`.
    ///
    /// Codes that resolve to nothing are skipped and listed in the result.
    /// A valid code without passport data still counts as an origin, so it
    /// empties the intersection.
    ///
    /// # Errors
    ///
    /// `EmptyArgument` when `codes` is empty; `UnknownCode` when none of the
    /// codes resolve.
    pub fn common_favorable<S: AsRef<str>>(
        &self,
        codes: &[S],
    ) -> Result<CommonDestinations, QueryError> {
        let codes: Vec<&str> = codes
            .iter()
            .map(|c| c.as_ref().trim())
            .filter(|c| !c.is_empty())
            .collect();
        if codes.is_empty() {
            return Err(QueryError::empty("codes"));
        }

        let mut origins: Vec<&str> = Vec::new();
        let mut skipped = Vec::new();
        for code in &codes {
            match self.codes.resolve(code) {
                Some(key) if !origins.contains(&key) => origins.push(key),
                Some(_) => {}
                None => {
                    log::warn!("skipping unknown passport code {}", code);
                    skipped.push(normalize_code(code));
                }
            }
        }
        if origins.is_empty() {
            return Err(QueryError::unknown(codes[0]));
        }

        let destinations = self.visas.common_favorable(&origins);
        Ok(CommonDestinations {
            origins: origins.into_iter().map(String::from).collect(),
            skipped,
            destinations,
        })
    }

    /// Every passport ranked by favorable-destination count.
    pub fn rank(&self) -> Vec<RankEntry> {
        self.visas.rank()
    }
}

fn index_by_key<R: Record>(
    dataset: &'static str,
    records: &[R],
    report: &mut BuildReport,
) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        let key = normalize_code(record.key());
        if index.insert(key.clone(), position).is_some() {
            log::warn!("{} {} defined more than once, keeping the last", dataset, key);
            report.duplicate_keys.push(key);
        }
    }
    index
}

fn lookup<'a, R>(
    records: &'a [R],
    index: &HashMap<String, usize>,
    key: &str,
    relation: &'static str,
) -> Result<&'a R, QueryError> {
    index
        .get(key)
        .and_then(|&position| records.get(position))
        .ok_or_else(|| QueryError::NoData {
            key: key.to_string(),
            relation,
        })
}
