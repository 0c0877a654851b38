use std::sync::Arc;

use crate::config::AddressPolicy;
use crate::directory::Directory;
use crate::metrics::Metrics;
use crate::notify::Notifier;
use crate::session::UserSession;

/// Collaborators shared by every turn.
#[derive(Clone)]
pub struct Services {
    pub directory: Arc<dyn Directory>,
    pub metrics: Metrics,
    pub notifier: Notifier,
    pub address_policy: AddressPolicy,
    pub qa: bool,
    pub default_lang: String,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("metrics", &self.metrics)
            .field("notifier", &self.notifier)
            .field("qa", &self.qa)
            .field("default_lang", &self.default_lang)
            .finish_non_exhaustive()
    }
}

/// What a route, choice source or entry hook sees during one turn: the
/// sender's session, exclusively, and the shared services.
pub struct TurnContext<'a> {
    pub session: &'a mut UserSession,
    pub services: &'a Services,
}

impl<'a> TurnContext<'a> {
    pub fn new(session: &'a mut UserSession, services: &'a Services) -> Self {
        Self { session, services }
    }

    pub fn address(&self) -> &str {
        &self.session.address
    }

    /// The session language, or the configured default.
    pub fn lang(&self) -> &str {
        self.session
            .lang
            .as_deref()
            .unwrap_or(&self.services.default_lang)
    }
}
