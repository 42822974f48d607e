//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{BookRepository, FinePolicy, LedgerRepository};
use crate::infrastructure::config::Config;
use crate::infrastructure::{SeaOrmBookRepository, SeaOrmLedgerRepository};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection (health checks)
    db: DatabaseConnection,
    /// Book inventory repository
    pub book_repo: Arc<dyn BookRepository>,
    /// Transaction ledger repository
    pub ledger_repo: Arc<dyn LedgerRepository>,
    /// Grace period and daily rate applied on return
    pub fine_policy: FinePolicy,
    /// Prefix for human-readable fines
    pub currency: String,
}

impl AppState {
    /// Create a new AppState with all repositories initialized and the
    /// default fine policy
    pub fn new(db: DatabaseConnection) -> Self {
        let book_repo = Arc::new(SeaOrmBookRepository::new(db.clone()));
        let ledger_repo = Arc::new(SeaOrmLedgerRepository::new(db.clone()));

        Self {
            db,
            book_repo,
            ledger_repo,
            fine_policy: FinePolicy::default(),
            currency: "$".to_string(),
        }
    }

    /// Create an AppState using the fine policy from configuration
    pub fn from_config(db: DatabaseConnection, config: &Config) -> Self {
        Self::new(db).with_fine_policy(config.fine_policy, &config.currency)
    }

    pub fn with_fine_policy(mut self, policy: FinePolicy, currency: &str) -> Self {
        self.fine_policy = policy;
        self.currency = currency.to_string();
        self
    }

    /// Get the database connection
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
