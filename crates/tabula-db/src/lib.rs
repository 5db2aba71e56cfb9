//! # tabula-db: Database Layer for Tabula
//!
//! Document persistence on SQLite with sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tabula Data Flow                                 │
//! │                                                                         │
//! │  tabula-billing (DocumentStore)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tabula-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌────────────────┐  ┌──────────────────┐  │   │
//! │  │   │   Database    │  │  Repository    │  │   Migrations     │  │   │
//! │  │   │   (pool.rs)   │  │ (document.rs)  │  │   (embedded)     │  │   │
//! │  │   │               │  │                │  │                  │  │   │
//! │  │   │ SqlitePool    │◄─│ DocumentRepo   │  │ 001_documents    │  │   │
//! │  │   │               │  │   ▲            │  │ 002_schema_v2    │  │   │
//! │  │   └───────────────┘  │   │ DocumentRow│  └──────────────────┘  │   │
//! │  │                      │   (schema.rs)  │                        │   │
//! │  │                      └────────────────┘                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (tabula.db)                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`schema`] - Versioned row layout and the v1/v2 adapter
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tabula_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("tabula.db")).await?;
//! let recent = db.documents().list_recent(50).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::document::DocumentRepository;
pub use schema::{DocumentRow, SchemaVersion};
