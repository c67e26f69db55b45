use std::sync::Arc;

use crate::config;
use crate::db;
use crate::email::GroupUserAddEmail;
use crate::error;
use crate::events::{EventManager, GROUP_ADD_SUCCESS};
use crate::store::Store;
use crate::template::Templates;

#[derive(Debug)]
pub struct Shared {
    store: Store,
    events: EventManager,
    session_cookie: String,
}

pub type ArcShared = Arc<Shared>;

impl Shared {
    pub fn from_config(config: &config::Config) -> error::Result<Shared> {
        tracing::debug!("creating Shared state");

        let pool = db::from_config(config)?;
        let store = Store::postgres(pool, config.settings.email.default_locale.clone());
        let templates = Arc::new(Templates::from_config(config)?);

        let mut events = EventManager::new();
        events.on(
            GROUP_ADD_SUCCESS,
            Arc::new(GroupUserAddEmail::new(templates, store.emails.clone()))
        );

        Ok(Shared::new(store, events, config.settings.sec.session.cookie.clone()))
    }

    pub fn new(store: Store, events: EventManager, session_cookie: String) -> Self {
        Shared {
            store,
            events,
            session_cookie,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn events(&self) -> &EventManager {
        &self.events
    }

    pub fn session_cookie(&self) -> &str {
        &self.session_cookie
    }
}
