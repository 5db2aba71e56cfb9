//! Shared application state.

use std::sync::Arc;

use tabula_billing::{
    CheckoutOrchestrator, DocumentService, DocumentStore, PaymentGateway, WebhookReconciler,
    WebhookVerifier,
};
use tabula_db::Database;

use crate::config::ApiConfig;

/// Services handed to every handler.
///
/// Built once at startup; handlers only read from it.
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub documents: DocumentService,
    pub checkout: CheckoutOrchestrator,
    pub webhooks: WebhookReconciler,
    /// Configured public origin, if any.
    pub app_url: Option<String>,
}

impl AppState {
    /// Wires services over `database` and the given payment gateway.
    pub fn new(config: &ApiConfig, database: Database, gateway: Arc<dyn PaymentGateway>) -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(database.documents());

        let verifier = WebhookVerifier::new(config.stripe.webhook_secret.clone())
            .tolerance(config.webhook_tolerance());

        AppState {
            documents: DocumentService::new(store.clone())
                .with_item_placeholder(config.item_placeholder.clone()),
            checkout: CheckoutOrchestrator::new(store.clone(), gateway)
                .with_item_placeholder(config.item_placeholder.clone()),
            webhooks: WebhookReconciler::new(store, verifier),
            app_url: config.app_url.clone(),
            database,
        }
    }
}

pub type SharedState = Arc<AppState>;
