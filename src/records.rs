//! Record types for the three reference datasets.
//!
//! Each type carries its canonical key, its alternate identifiers, a fixed
//! filter predicate table and an explicit top-level field table for
//! projection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::{Filterable, Matcher, PredicateDef, Probe};
use crate::project::FieldView;

/// An entity with a canonical key and alternate identifiers.
pub trait Record {
    /// Canonical key as stored in the source data.
    fn key(&self) -> &str;

    /// Every other identifier the entity is known by.
    fn alternate_codes(&self) -> Vec<&str>;
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

fn opt_json<T: Serialize>(value: &Option<T>) -> Option<Value> {
    value.as_ref().and_then(|v| to_json(v))
}

// === Countries ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub name: CountryName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cca2: Option<String>,
    pub cca3: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ccn3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cioc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fifa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub independent: Option<bool>,
    #[serde(default)]
    pub un_member: bool,
    #[serde(default)]
    pub capital: Vec<String>,
    #[serde(default)]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subregion: Option<String>,
    #[serde(default)]
    pub languages: BTreeMap<String, String>,
    #[serde(default)]
    pub currencies: BTreeMap<String, Currency>,
    #[serde(default)]
    pub translations: BTreeMap<String, Translation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<Flags>,
    #[serde(default)]
    pub borders: Vec<String>,
    #[serde(default)]
    pub population: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default)]
    pub latlng: Vec<f64>,
    #[serde(default)]
    pub timezones: Vec<String>,
    #[serde(default)]
    pub continents: Vec<String>,
    #[serde(default)]
    pub tld: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryName {
    pub common: String,
    #[serde(default)]
    pub official: String,
    #[serde(default)]
    pub native_name: BTreeMap<String, Translation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    #[serde(default)]
    pub official: String,
    pub common: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub png: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl Record for Country {
    fn key(&self) -> &str {
        &self.cca3
    }

    fn alternate_codes(&self) -> Vec<&str> {
        [&self.cca2, &self.ccn3, &self.cioc, &self.fifa]
            .into_iter()
            .filter_map(|code| code.as_deref())
            .collect()
    }
}

const COUNTRY_FIELDS: &[&str] = &[
    "name",
    "cca2",
    "cca3",
    "ccn3",
    "cioc",
    "fifa",
    "independent",
    "unMember",
    "capital",
    "region",
    "subregion",
    "languages",
    "currencies",
    "translations",
    "flags",
    "borders",
    "population",
    "area",
    "latlng",
    "timezones",
    "continents",
    "tld",
];

impl FieldView for Country {
    fn field_names(&self) -> &'static [&'static str] {
        COUNTRY_FIELDS
    }

    fn field_value(&self, name: &str) -> Option<Value> {
        match name {
            "name" => to_json(&self.name),
            "cca2" => opt_json(&self.cca2),
            "cca3" => to_json(&self.cca3),
            "ccn3" => opt_json(&self.ccn3),
            "cioc" => opt_json(&self.cioc),
            "fifa" => opt_json(&self.fifa),
            "independent" => opt_json(&self.independent),
            "unMember" => to_json(&self.un_member),
            "capital" => to_json(&self.capital),
            "region" => to_json(&self.region),
            "subregion" => opt_json(&self.subregion),
            "languages" => to_json(&self.languages),
            "currencies" => to_json(&self.currencies),
            "translations" => to_json(&self.translations),
            "flags" => opt_json(&self.flags),
            "borders" => to_json(&self.borders),
            "population" => to_json(&self.population),
            "area" => opt_json(&self.area),
            "latlng" => to_json(&self.latlng),
            "timezones" => to_json(&self.timezones),
            "continents" => to_json(&self.continents),
            "tld" => to_json(&self.tld),
            _ => None,
        }
    }
}

fn country_name(c: &Country) -> Probe<'_> {
    let mut names = vec![c.name.common.as_str(), c.name.official.as_str()];
    for native in c.name.native_name.values() {
        names.push(&native.common);
        names.push(&native.official);
    }
    Probe::Text(names)
}

fn country_independent(c: &Country) -> Probe<'_> {
    Probe::Flag(c.independent)
}

fn country_un_member(c: &Country) -> Probe<'_> {
    Probe::Flag(Some(c.un_member))
}

fn country_capital(c: &Country) -> Probe<'_> {
    Probe::Text(c.capital.iter().map(String::as_str).collect())
}

fn country_region(c: &Country) -> Probe<'_> {
    Probe::Text(vec![c.region.as_str()])
}

fn country_subregion(c: &Country) -> Probe<'_> {
    Probe::Text(c.subregion.as_deref().into_iter().collect())
}

fn country_code(c: &Country) -> Probe<'_> {
    let mut codes = c.alternate_codes();
    codes.push(&c.cca3);
    Probe::Text(codes)
}

fn country_currency(c: &Country) -> Probe<'_> {
    Probe::Keyed(
        c.currencies
            .iter()
            .map(|(code, currency)| (code.as_str(), vec![currency.name.as_str()]))
            .collect(),
    )
}

fn country_language(c: &Country) -> Probe<'_> {
    Probe::Keyed(
        c.languages
            .iter()
            .map(|(code, name)| (code.as_str(), vec![name.as_str()]))
            .collect(),
    )
}

fn country_translation(c: &Country) -> Probe<'_> {
    Probe::Keyed(
        c.translations
            .iter()
            .map(|(lang, t)| (lang.as_str(), vec![t.common.as_str(), t.official.as_str()]))
            .collect(),
    )
}

fn country_border(c: &Country) -> Probe<'_> {
    Probe::Text(c.borders.iter().map(String::as_str).collect())
}

fn country_continent(c: &Country) -> Probe<'_> {
    Probe::Text(c.continents.iter().map(String::as_str).collect())
}

fn country_timezone(c: &Country) -> Probe<'_> {
    Probe::Text(c.timezones.iter().map(String::as_str).collect())
}

fn country_tld(c: &Country) -> Probe<'_> {
    Probe::Text(c.tld.iter().map(String::as_str).collect())
}

const COUNTRY_PREDICATES: &[PredicateDef<Country>] = &[
    PredicateDef {
        name: "name",
        matcher: Matcher::Contains,
        probe: country_name,
    },
    PredicateDef {
        name: "independent",
        matcher: Matcher::Flag,
        probe: country_independent,
    },
    PredicateDef {
        name: "unmember",
        matcher: Matcher::Flag,
        probe: country_un_member,
    },
    PredicateDef {
        name: "capital",
        matcher: Matcher::Equals,
        probe: country_capital,
    },
    PredicateDef {
        name: "region",
        matcher: Matcher::Equals,
        probe: country_region,
    },
    PredicateDef {
        name: "subregion",
        matcher: Matcher::Equals,
        probe: country_subregion,
    },
    PredicateDef {
        name: "code",
        matcher: Matcher::Equals,
        probe: country_code,
    },
    PredicateDef {
        name: "currency",
        matcher: Matcher::Keyed,
        probe: country_currency,
    },
    PredicateDef {
        name: "language",
        matcher: Matcher::Keyed,
        probe: country_language,
    },
    PredicateDef {
        name: "translation",
        matcher: Matcher::Keyed,
        probe: country_translation,
    },
    PredicateDef {
        name: "border",
        matcher: Matcher::Equals,
        probe: country_border,
    },
    PredicateDef {
        name: "continent",
        matcher: Matcher::Equals,
        probe: country_continent,
    },
    PredicateDef {
        name: "timezone",
        matcher: Matcher::Equals,
        probe: country_timezone,
    },
    PredicateDef {
        name: "tld",
        matcher: Matcher::Equals,
        probe: country_tld,
    },
];

impl Filterable for Country {
    fn predicates() -> &'static [PredicateDef<Self>] {
        COUNTRY_PREDICATES
    }
}

// === Passports ===

/// Visa requirements for holders of one passport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passport {
    /// Canonical alpha-3 code of the issuing country.
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha2: Option<String>,
    pub name: String,
    /// Destination code → requirement, exactly as the source spells it.
    #[serde(default)]
    pub requirements: BTreeMap<String, VisaRule>,
}

/// One directed visa edge as recorded in the source.
///
/// Source files write either a plain string (`"visa required"`), a bare day
/// count (`90`) or a full object. Negative counts mark the passport's own
/// country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawVisaRule")]
pub struct VisaRule {
    pub requirement: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_stay: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl VisaRule {
    pub fn new(requirement: impl Into<String>) -> Self {
        Self {
            requirement: requirement.into(),
            allowed_stay: None,
            notes: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawVisaRule {
    Days(i64),
    Text(String),
    Full {
        requirement: String,
        #[serde(default, alias = "allowed_stay", rename = "allowedStay")]
        allowed_stay: Option<String>,
        #[serde(default)]
        notes: Option<String>,
    },
}

impl From<RawVisaRule> for VisaRule {
    fn from(raw: RawVisaRule) -> Self {
        match raw {
            RawVisaRule::Days(days) => VisaRule {
                requirement: days.to_string(),
                allowed_stay: (days > 0).then(|| format!("{} days", days)),
                notes: None,
            },
            RawVisaRule::Text(text) => VisaRule::new(text),
            RawVisaRule::Full {
                requirement,
                allowed_stay,
                notes,
            } => VisaRule {
                requirement,
                allowed_stay,
                notes,
            },
        }
    }
}

impl Record for Passport {
    fn key(&self) -> &str {
        &self.code
    }

    fn alternate_codes(&self) -> Vec<&str> {
        self.alpha2.as_deref().into_iter().collect()
    }
}

const PASSPORT_FIELDS: &[&str] = &["code", "alpha2", "name", "requirements"];

impl FieldView for Passport {
    fn field_names(&self) -> &'static [&'static str] {
        PASSPORT_FIELDS
    }

    fn field_value(&self, name: &str) -> Option<Value> {
        match name {
            "code" => to_json(&self.code),
            "alpha2" => opt_json(&self.alpha2),
            "name" => to_json(&self.name),
            "requirements" => to_json(&self.requirements),
            _ => None,
        }
    }
}

// === Airports ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub icao: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iata: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Alpha-2 or alpha-3 code of the country the airport is in.
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Record for Airport {
    fn key(&self) -> &str {
        &self.icao
    }

    fn alternate_codes(&self) -> Vec<&str> {
        self.iata.as_deref().into_iter().collect()
    }
}

const AIRPORT_FIELDS: &[&str] = &[
    "icao",
    "iata",
    "name",
    "city",
    "country",
    "latitude",
    "longitude",
    "elevation",
    "timezone",
];

impl FieldView for Airport {
    fn field_names(&self) -> &'static [&'static str] {
        AIRPORT_FIELDS
    }

    fn field_value(&self, name: &str) -> Option<Value> {
        match name {
            "icao" => to_json(&self.icao),
            "iata" => opt_json(&self.iata),
            "name" => to_json(&self.name),
            "city" => opt_json(&self.city),
            "country" => to_json(&self.country),
            "latitude" => opt_json(&self.latitude),
            "longitude" => opt_json(&self.longitude),
            "elevation" => opt_json(&self.elevation),
            "timezone" => opt_json(&self.timezone),
            _ => None,
        }
    }
}

fn airport_name(a: &Airport) -> Probe<'_> {
    Probe::Text(vec![a.name.as_str()])
}

fn airport_city(a: &Airport) -> Probe<'_> {
    Probe::Text(a.city.as_deref().into_iter().collect())
}

fn airport_country(a: &Airport) -> Probe<'_> {
    Probe::Text(vec![a.country.as_str()])
}

fn airport_iata(a: &Airport) -> Probe<'_> {
    Probe::Text(a.iata.as_deref().into_iter().collect())
}

fn airport_icao(a: &Airport) -> Probe<'_> {
    Probe::Text(vec![a.icao.as_str()])
}

fn airport_timezone(a: &Airport) -> Probe<'_> {
    Probe::Text(a.timezone.as_deref().into_iter().collect())
}

const AIRPORT_PREDICATES: &[PredicateDef<Airport>] = &[
    PredicateDef {
        name: "name",
        matcher: Matcher::Contains,
        probe: airport_name,
    },
    PredicateDef {
        name: "city",
        matcher: Matcher::Equals,
        probe: airport_city,
    },
    PredicateDef {
        name: "country",
        matcher: Matcher::Equals,
        probe: airport_country,
    },
    PredicateDef {
        name: "iata",
        matcher: Matcher::Equals,
        probe: airport_iata,
    },
    PredicateDef {
        name: "icao",
        matcher: Matcher::Equals,
        probe: airport_icao,
    },
    PredicateDef {
        name: "timezone",
        matcher: Matcher::Equals,
        probe: airport_timezone,
    },
];

impl Filterable for Airport {
    fn predicates() -> &'static [PredicateDef<Self>] {
        AIRPORT_PREDICATES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{filter, satisfies};
    use crate::project::project;
    use serde_json::json;

    fn spain() -> Country {
        serde_json::from_value(json!({
            "name": {
                "common": "Spain",
                "official": "Kingdom of Spain",
                "nativeName": { "spa": { "official": "Reino de España", "common": "España" } }
            },
            "cca2": "ES", "cca3": "ESP", "ccn3": "724", "cioc": "ESP",
            "independent": true, "unMember": true,
            "capital": ["Madrid"], "region": "Europe", "subregion": "Southern Europe",
            "languages": { "spa": "Spanish" },
            "currencies": { "EUR": { "name": "Euro", "symbol": "€" } },
            "translations": { "deu": { "official": "Königreich Spanien", "common": "Spanien" } },
            "flags": { "png": "es.png", "svg": "es.svg" },
            "borders": ["AND", "FRA", "GIB", "PRT", "MAR"],
            "population": 47351567
        }))
        .unwrap()
    }

    #[test]
    fn country_codes() {
        let es = spain();
        assert_eq!(es.key(), "ESP");
        assert_eq!(es.alternate_codes(), vec!["ES", "724", "ESP"]);
    }

    #[test]
    fn country_predicates() {
        let es = spain();
        assert_eq!(satisfies(&es, "name", "españa"), Some(true));
        assert_eq!(satisfies(&es, "name", "kingdom"), Some(true));
        assert_eq!(satisfies(&es, "capital", "MADRID"), Some(true));
        assert_eq!(satisfies(&es, "capital", "Mad"), Some(false));
        assert_eq!(satisfies(&es, "currency", "eur"), Some(true));
        assert_eq!(satisfies(&es, "currency", "euro"), Some(true));
        assert_eq!(satisfies(&es, "language", "spanish"), Some(true));
        assert_eq!(satisfies(&es, "translation", "spanien"), Some(true));
        assert_eq!(satisfies(&es, "translation", "DEU"), Some(true));
        assert_eq!(satisfies(&es, "code", "724"), Some(true));
        assert_eq!(satisfies(&es, "border", "fra"), Some(true));
        assert_eq!(satisfies(&es, "independent", "true"), Some(true));
        assert_eq!(satisfies(&es, "unmember", "false"), Some(false));
    }

    #[test]
    fn missing_independence_matches_neither_flag_value() {
        let mut es = spain();
        es.independent = None;
        assert_eq!(satisfies(&es, "independent", "true"), Some(false));
        assert_eq!(satisfies(&es, "independent", "false"), Some(false));
    }

    #[test]
    fn country_projection_uses_canonical_field_names() {
        let result = project(&spain(), &["UNMEMBER", "flags.svg", "currencies.eur.symbol"]);
        assert_eq!(
            Value::Object(result),
            json!({
                "unMember": true,
                "flags": { "svg": "es.svg" },
                "currencies": { "EUR": { "symbol": "€" } }
            })
        );
    }

    #[test]
    fn absent_optional_country_field_is_omitted() {
        let result = project(&spain(), &["fifa", "flags.alt"]);
        assert!(result.is_empty());
    }

    #[test]
    fn visa_rule_accepts_string_number_and_object() {
        let passport: Passport = serde_json::from_value(json!({
            "code": "USA",
            "alpha2": "US",
            "name": "United States",
            "requirements": {
                "CAN": "visa free",
                "GBR": 180,
                "CHN": { "requirement": "visa required", "allowedStay": null, "notes": "apply ahead" },
                "IND": { "requirement": "e-visa", "allowed_stay": "60 days" }
            }
        }))
        .unwrap();

        assert_eq!(passport.requirements["CAN"], VisaRule::new("visa free"));
        assert_eq!(passport.requirements["GBR"].requirement, "180");
        assert_eq!(
            passport.requirements["GBR"].allowed_stay.as_deref(),
            Some("180 days")
        );
        assert_eq!(
            passport.requirements["CHN"].notes.as_deref(),
            Some("apply ahead")
        );
        assert_eq!(
            passport.requirements["IND"].allowed_stay.as_deref(),
            Some("60 days")
        );
        assert_eq!(passport.alternate_codes(), vec!["US"]);
    }

    #[test]
    fn airport_filtering() {
        let airports: Vec<Airport> = serde_json::from_value(json!([
            { "icao": "KJFK", "iata": "JFK", "name": "John F Kennedy International Airport",
              "city": "New York", "country": "US" },
            { "icao": "EGLL", "iata": "LHR", "name": "London Heathrow Airport",
              "city": "London", "country": "GB" },
            { "icao": "KLGA", "iata": "LGA", "name": "LaGuardia Airport",
              "city": "New York", "country": "US" }
        ]))
        .unwrap();

        let found = filter(&airports, [("city", "new york"), ("name", "kennedy")]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key(), "KJFK");

        let found = filter(&airports, [("iata", "lhr")]).unwrap();
        assert_eq!(found[0].alternate_codes(), vec!["LHR"]);
    }
}
