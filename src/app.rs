//! Application context.
//!
//! One [`App`] is constructed at startup and passed explicitly to
//! every command handler; there is no global shared state.

use crate::config::Config;
use crate::db::{Database, User, UserRepository};
use crate::error::{FeedloopError, Result};

/// Application context shared by all command handlers.
pub struct App {
    /// Loaded configuration.
    pub config: Config,
    /// Open database.
    pub db: Database,
}

impl App {
    /// Build the context from a loaded configuration, opening the
    /// database it points at.
    pub async fn new(config: Config) -> Result<Self> {
        let db = Database::open(&config.db_url).await?;
        Ok(Self { config, db })
    }

    /// Resolve the currently logged-in user.
    ///
    /// Fails if no user is logged in or the configured user no longer
    /// exists in the database.
    pub async fn require_login(&self) -> Result<User> {
        let name = self.config.current_user()?;
        UserRepository::new(self.db.pool())
            .get_by_name(name)
            .await?
            .ok_or_else(|| FeedloopError::NotFound(format!("user '{}'", name)))
    }
}
