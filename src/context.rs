//! Application context.
//!
//! DESIGN
//! ======
//! `AppContext` owns everything the views need: storage, the catalog client,
//! the session store and the route guard. It is built once by [`AppContext::init`],
//! which rehydrates the session from storage, and ends with
//! [`AppContext::teardown`]. Nothing here is global; callers pass the context
//! (or pieces of it) to whatever needs them.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError, CredentialValidator};
use crate::config::AppConfig;
use crate::favorites::Favorites;
use crate::router::{Navigation, RouteGuard};
use crate::session::SessionStore;
use crate::storage::{FileStorage, Storage};
use crate::ui::UiEffects;

pub struct AppContext {
    pub config: AppConfig,
    pub api: Arc<ApiClient>,
    pub session: SessionStore,
    pub guard: RouteGuard,
    storage: Arc<dyn Storage>,
}

impl AppContext {
    /// Build a context backed by the file at `config.storage_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn init(config: AppConfig, effects: Arc<dyn UiEffects>) -> Result<Self, ApiError> {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(config.storage_path.clone()));
        Self::with_storage(config, storage, effects)
    }

    /// Build a context over an arbitrary storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_storage(
        config: AppConfig,
        storage: Arc<dyn Storage>,
        effects: Arc<dyn UiEffects>,
    ) -> Result<Self, ApiError> {
        let api = Arc::new(ApiClient::new(&config.api)?);
        let mut session = SessionStore::new(Arc::clone(&storage), effects);
        if config.validate_credentials {
            session = session.with_validator(Arc::clone(&api) as Arc<dyn CredentialValidator>);
        }

        let authenticated = session.check_auth();
        tracing::info!(
            base_url = api.base_url(),
            storage = %config.storage_path.display(),
            authenticated,
            "context initialized"
        );

        Ok(Self { config, api, session, guard: RouteGuard::default(), storage })
    }

    /// Gate a navigation on the current persisted session.
    pub fn navigate(&mut self, path: &str) -> Navigation {
        self.guard.navigate(path, &mut self.session)
    }

    /// Load the favorites set from this context's storage.
    #[must_use]
    pub fn favorites(&self) -> Favorites {
        Favorites::load(Arc::clone(&self.storage))
    }

    pub fn teardown(self) {
        tracing::debug!(authenticated = self.session.is_authenticated(), "context torn down");
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
