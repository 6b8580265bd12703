//! HTTP access to the remote store of record.
//!
//! [`HttpBackend`] implements [`engine::Backend`]; everything else in this
//! crate is the mapping between the store's tables and the wire contract.

pub use client::{HttpBackend, HttpBackendBuilder, RemoteError};
pub use query::{Order, Query};

mod client;
mod query;
mod rows;
