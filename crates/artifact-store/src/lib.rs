//! Object storage collaborator for snapgrid.
//!
//! The capture loop only ever needs "put bytes at a key"; anything richer
//! (listing, retention, batch inspection of a bucket folder) happens outside
//! this service. The filesystem store maps key segments to directories so a
//! 5-minute bucket of captures lands under one folder.

pub mod errors;
pub mod store;

pub use errors::StoreError;
pub use store::{FsObjectStore, MemoryObjectStore, ObjectStore};
