use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::net::error;
use crate::user::EmailContext;
use crate::user::group::Group;

pub const GROUP_ADD_SUCCESS: &str = "group.add.success";

/// a member was added to a newly created group
#[derive(Debug, Clone)]
pub struct GroupAdded {
    /// the member with the membership row attached
    pub user: EmailContext,
    pub admin: Arc<EmailContext>,
    pub group: Arc<Group>,
}

#[derive(Debug, Clone)]
pub enum Event {
    GroupAdded(GroupAdded),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::GroupAdded(_) => GROUP_ADD_SUCCESS,
        }
    }
}

#[async_trait]
pub trait Listener: Send + Sync {
    async fn handle(&self, event: &Event) -> error::Result<()>;
}

/// in process publish / subscribe.
///
/// listeners are called in the order they were registered and each one is
/// awaited before the next. the first listener that fails stops the
/// dispatch and its error is returned
#[derive(Default, Clone)]
pub struct EventManager {
    listeners: HashMap<&'static str, Vec<Arc<dyn Listener>>>,
}

impl EventManager {
    pub fn new() -> Self {
        EventManager {
            listeners: HashMap::new(),
        }
    }

    pub fn on(&mut self, name: &'static str, listener: Arc<dyn Listener>) {
        self.listeners.entry(name)
            .or_default()
            .push(listener);
    }

    pub async fn dispatch(&self, event: &Event) -> error::Result<()> {
        let Some(listeners) = self.listeners.get(event.name()) else {
            tracing::debug!(event = event.name(), "no listeners");

            return Ok(());
        };

        for listener in listeners {
            listener.handle(event).await?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug_map = f.debug_map();

        for (name, list) in &self.listeners {
            debug_map.entry(name, &list.len());
        }

        debug_map.finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::testing::{self, RecordingListener, FailingListener};

    #[tokio::test]
    async fn ordered_delivery() {
        let first = Arc::new(RecordingListener::new());
        let second = Arc::new(RecordingListener::new());
        let mut events = EventManager::new();

        events.on(GROUP_ADD_SUCCESS, first.clone());
        events.on(GROUP_ADD_SUCCESS, second.clone());

        events.dispatch(&testing::group_added_event("ada")).await.unwrap();
        events.dispatch(&testing::group_added_event("grace")).await.unwrap();

        assert_eq!(first.usernames(), vec!["ada@lockbox.test", "grace@lockbox.test"]);
        assert_eq!(second.usernames(), first.usernames());
    }

    #[tokio::test]
    async fn failure_stops_dispatch() {
        let after = Arc::new(RecordingListener::new());
        let mut events = EventManager::new();

        events.on(GROUP_ADD_SUCCESS, Arc::new(FailingListener));
        events.on(GROUP_ADD_SUCCESS, after.clone());

        assert!(events.dispatch(&testing::group_added_event("ada")).await.is_err());
        assert!(after.usernames().is_empty());
    }

    #[tokio::test]
    async fn no_listeners() {
        let events = EventManager::new();

        events.dispatch(&testing::group_added_event("ada")).await.unwrap();
    }
}
