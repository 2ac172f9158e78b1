//! Seeder - bootstraps empty collections from their fixtures.
//!
//! For each collection: if the store already holds records it is left alone,
//! otherwise the fixture's contents are bulk-inserted. Running it on every
//! start is therefore safe for a single instance. Two instances racing on an
//! empty store can both seed; count-then-insert is not atomic across
//! processes.

use std::fmt;

use crate::fixtures::FixtureDir;
use crate::record::Collection;
use crate::store::RecordStore;

/// What seeding did to one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The collection was empty and `inserted` fixture records were written.
    Seeded { inserted: usize },
    /// The collection already held `existing` records.
    Skipped { existing: usize },
    /// Seeding this collection failed; other collections are unaffected.
    Failed { reason: String },
}

impl fmt::Display for SeedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedOutcome::Seeded { inserted } => write!(f, "seeded {} records", inserted),
            SeedOutcome::Skipped { existing } => {
                write!(f, "skipped, {} records already present", existing)
            }
            SeedOutcome::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Per-collection results of one seeding pass, in `Collection::ALL` order.
#[derive(Debug, Clone, Default)]
pub struct SeedReport {
    pub outcomes: Vec<(Collection, SeedOutcome)>,
}

impl SeedReport {
    pub fn outcome(&self, collection: Collection) -> Option<&SeedOutcome> {
        self.outcomes
            .iter()
            .find(|(c, _)| *c == collection)
            .map(|(_, outcome)| outcome)
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes
            .iter()
            .any(|(_, outcome)| matches!(outcome, SeedOutcome::Failed { .. }))
    }
}

/// Seed every empty collection of `store` from `fixtures`.
pub fn seed(store: &dyn RecordStore, fixtures: &FixtureDir) -> SeedReport {
    let outcomes = Collection::ALL
        .iter()
        .map(|&collection| (collection, seed_collection(store, fixtures, collection)))
        .collect();
    SeedReport { outcomes }
}

fn seed_collection(
    store: &dyn RecordStore,
    fixtures: &FixtureDir,
    collection: Collection,
) -> SeedOutcome {
    let existing = match store.count(collection) {
        Ok(existing) => existing,
        Err(e) => return SeedOutcome::Failed { reason: e.to_string() },
    };
    if existing > 0 {
        return SeedOutcome::Skipped { existing };
    }

    let records = match fixtures.load(collection) {
        Ok(records) => records,
        Err(e) => return SeedOutcome::Failed { reason: e.to_string() },
    };

    match store.insert_many(collection, records) {
        Ok(inserted) => SeedOutcome::Seeded { inserted },
        Err(e) => SeedOutcome::Failed { reason: e.to_string() },
    }
}
