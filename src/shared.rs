//! Hot-swappable snapshot handle.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::atlas::Atlas;
use crate::error::LoadError;
use crate::loader::load_atlas;

/// Shared handle to the current [`Atlas`].
///
/// Readers take the snapshot once per query with [`SharedAtlas::current`] and
/// keep it for the whole query, so a concurrent [`SharedAtlas::replace`] never
/// changes data under a running query. The live snapshot is never mutated;
/// a reload builds a complete new one first and then swaps the pointer.
pub struct SharedAtlas {
    snap: ArcSwap<Atlas>,
}

impl SharedAtlas {
    pub fn new(atlas: Atlas) -> Self {
        Self {
            snap: ArcSwap::from_pointee(atlas),
        }
    }

    /// The snapshot in effect right now.
    #[inline]
    pub fn current(&self) -> Arc<Atlas> {
        self.snap.load_full()
    }

    /// Publish `atlas` and return the snapshot it replaced.
    pub fn replace(&self, atlas: Atlas) -> Arc<Atlas> {
        self.snap.swap(Arc::new(atlas))
    }

    /// Rebuild from `source` and publish the result.
    ///
    /// On error the current snapshot stays in place.
    pub fn reload(&self, source: &str) -> Result<Arc<Atlas>, LoadError> {
        let atlas = load_atlas(source)?;
        log::info!(
            "reloaded snapshot from {}: {} countries, {} passports, {} airports",
            source,
            atlas.countries().len(),
            atlas.passports().len(),
            atlas.airports().len()
        );
        Ok(self.replace(atlas))
    }
}

impl std::fmt::Debug for SharedAtlas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snap = self.snap.load();
        f.debug_struct("SharedAtlas")
            .field("countries", &snap.countries().len())
            .field("passports", &snap.passports().len())
            .finish()
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

    fn atlas_with(requirement: &str) -> Atlas {
        let passport = Passport {
            code: "USA".into(),
            alpha2: None,
            name: "United States".into(),
            requirements: [("CAN".to_string(), VisaRule::new(requirement))]
                .into_iter()
                .collect(),
        };
        Atlas::new(
            vec![country("USA", "US"), country("CAN", "CA")],
            vec![passport],
            vec![],
        )
    }

    #[test]
    fn held_snapshot_survives_replace() {
        let shared = SharedAtlas::new(atlas_with("visa free"));
        let before = shared.current();

        let old = shared.replace(atlas_with("visa required"));
        assert!(Arc::ptr_eq(&before, &old));

        assert_eq!(before.favorable_destinations("US").unwrap(), vec!["CAN"]);
        assert!(shared
            .current()
            .favorable_destinations("US")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn failed_reload_keeps_current() {
        let shared = SharedAtlas::new(atlas_with("visa free"));
        let result = shared.reload("/nonexistent/atlas-data");
        assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
        assert_eq!(shared.current().countries().len(), 2);
    }
}
