//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::api::cookies::CookieBuilder;
use crate::application::services::{AdminService, AuthService, LinkService};
use crate::config::Config;
use crate::domain::repositories::{LinkRepository, UserRepository};
use crate::utils::short_url::build_short_url;

/// Services and response settings shared across requests.
///
/// Cloned per request; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub auth_service: Arc<AuthService>,
    pub admin_service: Arc<AdminService>,
    pub cookies: CookieBuilder,
    /// Public base used to build `shortUrl` fields.
    pub frontend_url: Option<Arc<str>>,
}

impl AppState {
    /// Wires the services over the given repositories.
    pub fn new(
        config: &Config,
        link_repository: Arc<dyn LinkRepository>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        let link_service = Arc::new(LinkService::new(link_repository.clone()));
        let auth_service = Arc::new(AuthService::from_config(user_repository.clone(), config));
        let admin_service = Arc::new(AdminService::new(
            link_repository,
            user_repository,
            config.admin_email.clone(),
        ));

        Self {
            link_service,
            auth_service,
            admin_service,
            cookies: CookieBuilder::from_config(config),
            frontend_url: config.frontend_url.as_deref().map(Arc::from),
        }
    }

    /// Full short URL for `short_id`, if a public base is configured.
    pub fn short_url(&self, short_id: &str) -> Option<String> {
        build_short_url(self.frontend_url.as_deref(), short_id)
    }
}
