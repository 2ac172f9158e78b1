mod fixtures;
mod record;
mod seed;
mod store;

#[cfg(feature = "http")]
pub mod http;

pub use fixtures::{load_fixture, FixtureDir, FixtureError, FixtureLoad};
pub use record::{coerce_integer_field, field_matches, record_id, Collection, Record};
pub use seed::{seed, SeedOutcome, SeedReport};
pub use store::{DocumentStore, InMemoryStore, RecordStore, StoreError};
