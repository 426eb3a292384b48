//! Core types shared by the query components.

use serde::{Deserialize, Serialize};

/// Visa requirement class, ordered by favorability.
///
/// Variants are declared from least to most favorable so that `a > b` means
/// `a` is the easier entry regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// Text that none of the classification rules recognize.
    Unknown,
    NoAdmission,
    VisaRequired,
    ElectronicVisa,
    /// Visa on arrival or an electronic travel authorization (eTA).
    OnArrival,
    VisaFree,
}

/// Phrases meaning entry is refused outright.
const NO_ADMISSION: &[&str] = &[
    "no admission",
    "not admitted",
    "admission refused",
    "entry not allowed",
    "travel ban",
    "covid ban",
];

/// Phrases meaning no visa is needed.
const VISA_FREE: &[&str] = &[
    "not required",
    "visa free",
    "visa-free",
    "visa exempt",
    "freedom of movement",
];

const ON_ARRIVAL: &[&str] = &["on arrival", "electronic travel authori", "e-ta"];

const ELECTRONIC_VISA: &[&str] = &["e-visa", "evisa", "electronic visa"];

impl Requirement {
    /// Classify free-form requirement text.
    ///
    /// Matching is case-insensitive. Rules are tried from the most
    /// restrictive outright refusal, then from most to least favorable, so
    /// "visa not required" is never read as "required" and
    /// "e-visa required" is an e-visa. A bare day count ("90", "30 days")
    /// means a stay granted without prior application.
    pub fn classify(text: &str) -> Self {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return Requirement::Unknown;
        }

        if is_day_count(&text) {
            return Requirement::VisaFree;
        }

        let contains_any = |phrases: &[&str]| phrases.iter().any(|p| text.contains(p));

        if contains_any(NO_ADMISSION) {
            Requirement::NoAdmission
        } else if contains_any(VISA_FREE) {
            Requirement::VisaFree
        } else if contains_any(ON_ARRIVAL) || has_word(&text, "eta") {
            Requirement::OnArrival
        } else if contains_any(ELECTRONIC_VISA) {
            Requirement::ElectronicVisa
        } else if text.contains("required") {
            Requirement::VisaRequired
        } else {
            Requirement::Unknown
        }
    }

    /// Whether this class counts toward rankings and intersections.
    pub fn is_favorable(self) -> bool {
        matches!(
            self,
            Requirement::VisaFree | Requirement::OnArrival | Requirement::ElectronicVisa
        )
    }
}

/// "90", "90 days", "30 day".
fn is_day_count(text: &str) -> bool {
    let mut words = text.split_whitespace();
    let Some(first) = words.next() else {
        return false;
    };
    if first.parse::<u32>().map_or(true, |days| days == 0) {
        return false;
    }
    match (words.next(), words.next()) {
        (None, None) => true,
        (Some("day" | "days"), None) => true,
        _ => false,
    }
}

fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .any(|w| w == word)
}

/// Offset/limit slice applied to a result list after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    /// `None` means no upper bound.
    pub limit: Option<usize>,
}

impl Page {
    pub fn new(offset: usize, limit: Option<usize>) -> Self {
        Self { offset, limit }
    }

    /// Slice `items`; an offset past the end yields an empty slice.
    pub fn apply<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset.min(items.len());
        let end = match self.limit {
            Some(limit) => start.saturating_add(limit).min(items.len()),
            None => items.len(),
        };
        &items[start..end]
    }
}

/// Normalize a code for registry storage and lookup.
pub(crate) fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
