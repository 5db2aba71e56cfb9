//! # tabula-billing: Document, Checkout and Webhook Services
//!
//! The service layer of Tabula. Each service gets its collaborators
//! injected at construction; there is no global client.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  billing-api handlers                                                  │
//! │       │                                                                 │
//! │  ┌────▼────────────────────────────────────────────────────────────┐   │
//! │  │              tabula-billing (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │  DocumentService     CheckoutOrchestrator     WebhookReconciler │   │
//! │  │        │                 │          │               │    │      │   │
//! │  │        └────────┬────────┘          │               │    │      │   │
//! │  │                 ▼                   ▼               │    ▼      │   │
//! │  │          DocumentStore        PaymentGateway ◄──────┘ Webhook-  │   │
//! │  │          (trait)              (trait)                 Verifier  │   │
//! │  └─────────────┬───────────────────────┬───────────────────────────┘   │
//! │                ▼                       ▼                                │
//! │        tabula-db (SQLite)       StripeGateway (reqwest)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`documents`] - Create / get / list documents
//! - [`checkout`] - Hosted checkout sessions for unpaid invoices
//! - [`webhook`] - Signed payment notifications → paid invoices
//! - [`signature`] - Webhook signature verification
//! - [`store`] - Storage trait and its SQLite implementation
//! - [`gateway`] - Payment processor trait
//! - [`stripe`] - Stripe REST implementation of the gateway
//! - [`error`] - Service error taxonomy

pub mod checkout;
pub mod documents;
pub mod error;
pub mod gateway;
pub mod signature;
pub mod store;
pub mod stripe;
pub mod webhook;

#[cfg(test)]
mod testing;

pub use checkout::CheckoutOrchestrator;
pub use documents::DocumentService;
pub use error::{BillingError, BillingResult};
pub use gateway::{CheckoutSession, CheckoutSessionRequest, GatewayError, PaymentGateway};
pub use signature::{SignatureError, WebhookVerifier};
pub use store::{DocumentStore, StoreError};
pub use stripe::{StripeConfig, StripeGateway};
pub use webhook::{IgnoreReason, WebhookOutcome, WebhookReconciler};
