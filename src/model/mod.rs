//! Data model: file records, root directories, resolution, and the catalog.

pub mod record;
pub mod resolver;
pub mod store;

pub use record::{hash_to_hex, FileRecord, Hash, RecordId, RootDirectory, RootId};
pub use resolver::{Resolution, RootResolver, RootSet};
pub use store::{Catalog, Snapshot};
