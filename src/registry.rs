//! Canonical code registry.
//!
//! Maps every known alternate identifier of an entity (ISO alpha-2, alpha-3,
//! numeric, IOC, FIFA, IATA...) to one canonical key. Lookups are
//! case-insensitive exact matches; there is no fuzzy fallback.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::normalize_code;

/// An alternate code that was re-bound to a different canonical key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub code: String,
    /// Key the code was bound to before this registration.
    pub previous: String,
    /// Key the code is bound to now.
    pub current: String,
}

/// Registry of alternate code → canonical key bindings.
///
/// Populated during snapshot construction and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct CodeRegistry {
    label: &'static str,
    codes: HashMap<String, String>,
    collisions: Vec<Collision>,
}

impl CodeRegistry {
    /// Create an empty registry. `label` names it in log output.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            ..Self::default()
        }
    }

    /// Bind `canonical` and every code in `alternates` to `canonical`.
    ///
    /// Empty codes are skipped. Re-binding a code to a different key is a
    /// collision: the last registration wins, the collision is logged at
    /// `warn` and recorded, and it is returned to the caller.
    pub fn register<I, S>(&mut self, canonical: &str, alternates: I) -> Vec<Collision>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let canonical = normalize_code(canonical);
        if canonical.is_empty() {
            return Vec::new();
        }

        let mut found = Vec::new();
        let codes = std::iter::once(canonical.clone())
            .chain(alternates.into_iter().map(|c| normalize_code(c.as_ref())));
        for code in codes {
            if code.is_empty() {
                continue;
            }
            if let Some(previous) = self.codes.insert(code.clone(), canonical.clone()) {
                if previous != canonical {
                    log::warn!(
                        "{} registry: code {} rebound from {} to {}",
                        self.label,
                        code,
                        previous,
                        canonical
                    );
                    found.push(Collision {
                        code,
                        previous,
                        current: canonical.clone(),
                    });
                }
            }
        }

        self.collisions.extend(found.iter().cloned());
        found
    }

    /// Resolve any registered code to its canonical key.
    ///
    /// Returns `None` for unregistered codes; never guesses.
    pub fn resolve(&self, code: &str) -> Option<&str> {
        self.codes.get(&normalize_code(code)).map(String::as_str)
    }

    /// Every collision seen while registering, in registration order.
    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Number of registered codes (canonical keys included).
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
