//! Storage substrates for the two scopes.
//!
//! # Modules
//!
//! - [`backend`] — the [`StorageBackend`] trait every substrate implements.
//! - [`memory`] — in-process map, used for session scope and tests.
//! - [`file`] — durable JSON map file, used by the CLI.
//!
//! The browser substrate (`localStorage` / `sessionStorage`) lives in the
//! wasm bindings crate, since it needs `web-sys`.

pub mod backend;
pub mod file;
pub mod memory;

pub use backend::StorageBackend;
pub use file::FileStorage;
pub use memory::MemoryStorage;
