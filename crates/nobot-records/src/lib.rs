//! # nobot-records
//!
//! Per-group record store for the nobot moderation add-on.
//!
//! Tracks which accounts have been tagged as bot-like in each group, when
//! each tagged account last spoke, and the per-group monitoring and
//! enforcement flags. The store is pure data: the only side effect is the
//! write-through call into a [`Persistence`] collaborator after each
//! structural mutation.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use nobot_records::{MemoryPersistence, RecordStore, Snapshot, SystemClock};
//!
//! let persistence = Arc::new(MemoryPersistence::default());
//! let mut store = RecordStore::new(Snapshot::new(), persistence.clone(), Arc::new(SystemClock));
//!
//! assert!(store.tag("group-1", "10001"));
//! assert!(!store.tag("group-1", "10001"));
//! assert!(store.is_tagged("group-1", "10001"));
//! assert_eq!(persistence.writes(), 1);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod clock;
pub mod error;
pub mod persist;
pub mod record;
pub mod schema;
pub mod store;

pub use self::clock::{Clock, ManualClock, SystemClock};
pub use self::error::StoreError;
pub use self::persist::{JsonFilePersistence, MemoryPersistence, Persistence};
pub use self::record::{GroupRecord, Snapshot, Timestamp, TIMESTAMP_FORMAT};
pub use self::schema::{decode_snapshot, Decoded};
pub use self::store::RecordStore;
