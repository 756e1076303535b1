//! The expiring key-value store.
//!
//! - [`scope`] — session vs. persistent substrate.
//! - [`record`] — the stored envelope and its deadline.
//! - [`store`] — [`ExpiringKeyStore`] and its builder.

pub mod record;
pub mod scope;
pub mod store;

pub use record::StoredRecord;
pub use scope::StorageScope;
pub use store::{ExpiringKeyStore, Lookup, StoreBuilder};
