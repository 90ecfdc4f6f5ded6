//! Join of normalized regions with the catalog into the playable set.

use hashbrown::HashMap;
use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;

use crate::{
    catalog::{Catalog, CountryRecord},
    types::CountryId,
    world::regions::RegionCollection,
};

/// A region successfully joined to a catalog record, eligible for quiz
/// use.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayableEntity {
    /// Numeric country code shared by region and record.
    pub id: CountryId,
    /// Resolved display name, precomputed for sorting and filtering.
    pub display_name: String,
    /// Flag rendering code (alpha-2).
    pub flag_code: String,
    /// Full catalog record.
    pub record: CountryRecord,
}

/// Ordered playable entities for one session, immutable after build.
#[derive(Debug, Clone, Default)]
pub struct PlayableSet {
    entries: Vec<PlayableEntity>,
    by_id: HashMap<CountryId, usize>,
}

impl PlayableSet {
    /// Intersects the region collection with the catalog.
    ///
    /// Drops, in order: regions with degenerate geometry, regions whose
    /// identifier is not a finite number, regions without a catalog
    /// record, records without an alpha-2 code. At most one entity per
    /// numeric code survives. Entities are sorted ascending by display
    /// name under Korean collation; the ordering is presentational only.
    pub fn build(regions: &RegionCollection, catalog: &Catalog) -> Self {
        let mut entries: Vec<PlayableEntity> = Vec::new();
        let mut by_id: HashMap<CountryId, usize> = HashMap::new();

        for region in &regions.regions {
            if region.geometry.is_degenerate() {
                continue;
            }
            let Some(id) = region.numeric_id() else {
                continue;
            };
            if by_id.contains_key(&id) {
                continue;
            }
            let Some(record) = catalog.by_numeric(id) else {
                continue;
            };
            let Some(flag_code) = record.cca2.clone() else {
                continue;
            };
            by_id.insert(id, 0);
            entries.push(PlayableEntity {
                id,
                display_name: record.display_name().to_string(),
                flag_code,
                record: record.clone(),
            });
        }

        sort_by_display_name(&mut entries);
        for (idx, entity) in entries.iter().enumerate() {
            by_id.insert(entity.id, idx);
        }

        tracing::debug!(
            regions = regions.len(),
            playable = entries.len(),
            "built playable set"
        );

        Self { entries, by_id }
    }

    /// Entities in display order.
    pub fn entries(&self) -> &[PlayableEntity] {
        &self.entries
    }

    /// Looks up an entity by numeric code.
    pub fn get(&self, id: CountryId) -> Option<&PlayableEntity> {
        self.by_id.get(&id).map(|idx| &self.entries[*idx])
    }

    /// True when the given code is playable.
    pub fn contains(&self, id: CountryId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// All playable numeric codes in display order.
    pub fn ids(&self) -> impl Iterator<Item = CountryId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    /// Number of playable entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is playable.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring filter over display names. An empty or
    /// whitespace-only query matches everything.
    pub fn filter<'a>(&'a self, query: &str) -> Vec<&'a PlayableEntity> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .filter(|e| e.display_name.to_lowercase().contains(&q))
            .collect()
    }
}

/// Korean-collation sort; the bundled locale is Korean and codepoint
/// order misplaces mixed Hangul/Latin lists. Falls back to codepoint
/// order only when collation data is unavailable.
fn sort_by_display_name(entries: &mut [PlayableEntity]) {
    match Collator::try_new(&locale!("ko").into(), CollatorOptions::new()) {
        Ok(collator) => {
            entries.sort_by(|a, b| collator.compare(&a.display_name, &b.display_name));
        }
        Err(err) => {
            tracing::warn!(?err, "korean collation unavailable, using codepoint order");
            entries.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        }
    }
}
