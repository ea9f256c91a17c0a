//! Storage abstractions and implementations.
//!
//! The core persists three tables through [`KeyValueStore`]:
//!
//! | Table         | Key              | Index        |
//! |---------------|------------------|--------------|
//! | `meta`        | `masterKey`      | none         |
//! | `notes`       | note id          | `updatedAt`  |
//! | `credentials` | credential id    | `createdAt`  |

mod memory;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{KeyValueStore, KeyValueStoreExt};

pub(crate) use traits::validate_index_name;

/// Table holding the wrapped master key record.
pub const META_TABLE: &str = "meta";
/// Key of the master key record inside [`META_TABLE`].
pub const MASTER_KEY_KEY: &str = "masterKey";
/// Table holding encrypted notes.
pub const NOTES_TABLE: &str = "notes";
/// Index used to list notes.
pub const NOTES_INDEX: &str = "updatedAt";
/// Table holding registered WebAuthn credentials.
pub const CREDENTIALS_TABLE: &str = "credentials";
/// Index used to list credentials.
pub const CREDENTIALS_INDEX: &str = "createdAt";
