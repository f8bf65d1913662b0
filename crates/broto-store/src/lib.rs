//! # broto-store
//!
//! Persistence and query layer for the Broto complaint desk.
//!
//! All state — user accounts, complaints, the session pointer, and the
//! complaint-code sequence — lives in named key-value namespaces inside one
//! SQLite file, each holding a JSON document serialized to text. Stores do
//! whole-collection read-modify-write; there is no per-record update path
//! at the substrate level.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  IdentityStore        ComplaintStore         │
//! │  (users, session)     (complaints, counter)  │
//! ├──────────────────────────────────────────────┤
//! │  RecordStore (namespace → JSON text)         │
//! ├──────────────────────────────────────────────┤
//! │  Database (rusqlite, WAL)                    │
//! │  Migrations (versioned, transactional)       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The query engine ([`query`]) and dashboard stats ([`stats::Stats`]) are
//! pure in-memory derivations consumed by views; they never touch the
//! store.
//!
//! ## Quick start
//!
//! ```ignore
//! use broto_store::{ComplaintStore, Database, IdentityStore, RecordStore};
//!
//! let db = Database::open_and_migrate("data/broto.db").await?;
//! let records = RecordStore::new(db);
//! let identity = IdentityStore::new(records.clone());
//! let complaints = ComplaintStore::new(records);
//! ```

pub mod complaints;
pub mod contact;
pub mod db;
pub mod error;
pub mod identity;
pub mod migration;
pub mod query;
pub mod records;
pub mod stats;

// ── re-exports ───────────────────────────────────────────────────────

pub use complaints::{
    Category, Complaint, ComplaintPatch, ComplaintStore, NewComplaint, Note, Priority, Status,
};
pub use db::Database;
pub use error::{StoreError, StoreResult};
pub use identity::{IdentityStore, LoginOutcome, User, UserPatch, UserRole};
pub use query::{ComplaintFilter, SortKey, query};
pub use records::RecordStore;
pub use stats::Stats;
