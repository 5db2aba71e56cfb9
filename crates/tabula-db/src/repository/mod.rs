//! # Repository Module
//!
//! Database repository implementations for Tabula.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DocumentService / CheckoutOrchestrator / WebhookReconciler            │
//! │       │                                                                 │
//! │       │  via the DocumentStore trait (tabula-billing)                  │
//! │       ▼                                                                 │
//! │  DocumentRepository                                                    │
//! │  ├── insert(&self, doc)                                                │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list_recent(&self, limit)                                         │
//! │  ├── attach_checkout_session(&self, id, session_id)                    │
//! │  └── mark_paid(&self, id, payment_reference)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod document;
