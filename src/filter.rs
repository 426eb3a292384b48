//! Predicate filter composition.
//!
//! A filter is a conjunction of named predicates. Every record type declares
//! its predicate table through [`Filterable`]; each entry fixes the match
//! strategy for that name, so callers only ever supply `name → value` pairs.

use std::fmt;

use crate::error::QueryError;

/// How a predicate compares its value against a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Boolean equality. Accepts true/false, 1/0, yes/no.
    Flag,
    /// Case-insensitive substring over any candidate field.
    Contains,
    /// Case-insensitive equality with any candidate field.
    Equals,
    /// Case-insensitive equality with a key of a nested keyed collection,
    /// or with any sub-field value stored under a key.
    Keyed,
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Matcher::Flag => "boolean",
            Matcher::Contains => "substring",
            Matcher::Equals => "exact",
            Matcher::Keyed => "key or value",
        };
        f.write_str(name)
    }
}

/// Candidate values a record offers to one predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Probe<'a> {
    Flag(Option<bool>),
    Text(Vec<&'a str>),
    /// `(key, sub-field values)` per entry of a keyed collection.
    Keyed(Vec<(&'a str, Vec<&'a str>)>),
}

/// One named predicate in a record type's predicate table.
pub struct PredicateDef<R> {
    pub name: &'static str,
    pub matcher: Matcher,
    pub probe: fn(&R) -> Probe<'_>,
}

/// Record types that can be filtered by name.
pub trait Filterable: Sized + 'static {
    /// The fixed predicate table for this record type.
    fn predicates() -> &'static [PredicateDef<Self>];

    /// Look up a predicate by case-insensitive name.
    fn predicate(name: &str) -> Option<&'static PredicateDef<Self>> {
        Self::predicates()
            .iter()
            .find(|def| def.name.eq_ignore_ascii_case(name.trim()))
    }
}

/// Comparison value after parsing, lowercased once up front.
enum Needle {
    Flag(Option<bool>),
    Text(String),
}

struct Compiled<R: 'static> {
    def: &'static PredicateDef<R>,
    needle: Needle,
}

/// Return the records matching every supplied predicate, in input order.
///
/// Unrecognized predicate names are ignored (logged at `debug`). An empty
/// predicate set returns every record. A predicate with an empty value is
/// rejected before any record is examined.
///
/// # Errors
///
/// Returns `QueryError::EmptyArgument` naming the first predicate whose
/// value is blank.
pub fn filter<'r, R, I, K, V>(records: &'r [R], predicates: I) -> Result<Vec<&'r R>, QueryError>
where
    R: Filterable,
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let compiled = compile::<R, _, _, _>(predicates)?;
    Ok(records
        .iter()
        .filter(|record| compiled.iter().all(|c| matches(c, record)))
        .collect())
}

/// Whether `record` satisfies one named predicate.
///
/// Unknown names are `None`, so callers can tell "no such predicate" from
/// "does not match".
pub fn satisfies<R: Filterable>(record: &R, name: &str, value: &str) -> Option<bool> {
    let def = R::predicate(name)?;
    let compiled = Compiled {
        def,
        needle: parse_needle(def.matcher, value),
    };
    Some(matches(&compiled, record))
}

fn compile<R, I, K, V>(predicates: I) -> Result<Vec<Compiled<R>>, QueryError>
where
    R: Filterable,
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut compiled = Vec::new();
    for (name, value) in predicates {
        let (name, value) = (name.as_ref(), value.as_ref());
        if value.trim().is_empty() {
            return Err(QueryError::empty(name));
        }
        match R::predicate(name) {
            Some(def) => {
                let needle = parse_needle(def.matcher, value);
                if let Needle::Flag(None) = needle {
                    log::debug!(
                        "{} predicate {:?} cannot use value {:?}, matching nothing",
                        def.matcher,
                        def.name,
                        value
                    );
                }
                compiled.push(Compiled { def, needle });
            }
            None => log::debug!("ignoring unknown filter predicate {:?}", name),
        }
    }
    Ok(compiled)
}

fn parse_needle(matcher: Matcher, value: &str) -> Needle {
    match matcher {
        Matcher::Flag => Needle::Flag(parse_flag(value)),
        _ => Needle::Text(value.trim().to_lowercase()),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn matches<R: 'static>(compiled: &Compiled<R>, record: &R) -> bool {
    let probe = (compiled.def.probe)(record);
    match (&compiled.needle, compiled.def.matcher, probe) {
        // An unparseable boolean matches nothing.
        (Needle::Flag(wanted), Matcher::Flag, Probe::Flag(actual)) => {
            wanted.is_some() && *wanted == actual
        }
        (Needle::Text(needle), Matcher::Contains, Probe::Text(fields)) => fields
            .iter()
            .any(|field| field.to_lowercase().contains(needle.as_str())),
        (Needle::Text(needle), Matcher::Equals, Probe::Text(fields)) => {
            fields.iter().any(|field| field.to_lowercase() == *needle)
        }
        (Needle::Text(needle), Matcher::Keyed, Probe::Keyed(entries)) => {
            entries.iter().any(|(key, values)| {
                key.to_lowercase() == *needle || values.iter().any(|v| v.to_lowercase() == *needle)
            })
        }
        _ => false,
    }
}
