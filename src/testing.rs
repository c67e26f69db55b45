use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use lockbox_api::groups::{CreateGroup, CreateGroupUser};
use lockbox_lib::ids;
use lockbox_lib::sec::role::Role;

use crate::email::{EmailQueue, GroupUserAddEmail, QueuedEmail};
use crate::events::{Event, EventManager, GroupAdded, Listener, GROUP_ADD_SUCCESS};
use crate::net::error;
use crate::sec::authn::initiator::Initiator;
use crate::sec::authn::session::{self, Session, SessionStore, TokenHash};
use crate::state::{ArcShared, Shared};
use crate::store::{Store, StoreError};
use crate::template::Templates;
use crate::user::{User, UserStatus, UserStore, EmailContext, Profile};
use crate::user::group::{self, Group, GroupDraft, GroupStore, NewGroup, SaveOutcome};

pub const DEFAULT_LOCALE: &str = "en-UK";

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn username(name: &str) -> String {
    format!("{name}@lockbox.test")
}

pub fn user(name: &str, role: Role) -> User {
    User {
        id: ids::from_name(name),
        role,
    }
}

pub fn email_context(name: &str) -> EmailContext {
    EmailContext {
        id: ids::from_name(name),
        username: username(name),
        locale: DEFAULT_LOCALE.to_owned(),
        profile: Profile {
            first_name: capitalize(name),
            last_name: String::from("Tester"),
        },
        groups_users: None,
    }
}

pub fn initiator(name: &str, role: Role) -> Initiator {
    Initiator {
        user: user(name, role),
    }
}

/// an event for a member named `name` added to "Freelancer" by "admin"
pub fn group_added_event(name: &str) -> Event {
    let now = Utc::now();
    let group_id = ids::from_name("Freelancer");
    let group_user = group::GroupUser {
        id: ids::create_id(),
        group_id,
        user_id: ids::from_name(name),
        is_admin: false,
        created: now,
    };

    Event::GroupAdded(GroupAdded {
        user: email_context(name).with_group_user(group_user.clone()),
        admin: Arc::new(email_context("admin")),
        group: Arc::new(Group {
            id: group_id,
            name: String::from("Freelancer"),
            deleted: false,
            created: now,
            modified: now,
            created_by: ids::from_name("admin"),
            modified_by: ids::from_name("admin"),
            groups_users: vec![group_user],
        }),
    })
}

/// validates and saves a group directly in the store
pub async fn saved_group(
    memory: &Memory,
    name: &str,
    admin: &ids::UserId,
    members: &[(ids::UserId, bool)]
) -> Group {
    let data = CreateGroup {
        name: name.to_owned(),
        groups_users: members.iter()
            .map(|(user_id, is_admin)| CreateGroupUser {
                user_id: user_id.to_string(),
                is_admin: *is_admin,
            })
            .collect(),
    };

    let new_group = GroupDraft::new(data, admin)
        .validate(memory, memory)
        .await
        .unwrap()
        .guard()
        .unwrap();

    match memory.save(&new_group).await.unwrap() {
        SaveOutcome::Saved(group) => group,
        outcome => panic!("group was not saved: {outcome:#?}"),
    }
}

#[derive(Debug, Clone, Copy)]
pub enum SaveMode {
    Store,
    NotSaved,

    /// the named constraint rejects the group (`member` is `None`) or the
    /// member at the index, as the database would on a concurrent change
    Violate {
        constraint: &'static str,
        member: Option<usize>,
    },
}

struct MemoryUser {
    user: User,
    status: UserStatus,
    context: EmailContext,
}

/// in memory implementation of every store
pub struct Memory {
    users: Mutex<HashMap<ids::UserId, MemoryUser>>,
    groups: Mutex<Vec<Group>>,
    sessions: Mutex<HashMap<TokenHash, Session>>,
    emails: Mutex<Vec<QueuedEmail>>,
    save_mode: Mutex<SaveMode>,
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            users: Mutex::new(HashMap::new()),
            groups: Mutex::new(Vec::new()),
            sessions: Mutex::new(HashMap::new()),
            emails: Mutex::new(Vec::new()),
            save_mode: Mutex::new(SaveMode::Store),
        }
    }

    /// adds an active user with an id derived from `name`
    pub fn add_user(&self, name: &str, role: Role) -> ids::UserId {
        let user = user(name, role);
        let id = user.id;

        self.users.lock().unwrap().insert(id, MemoryUser {
            user,
            status: UserStatus {
                id,
                active: true,
                deleted: false,
            },
            context: email_context(name),
        });

        id
    }

    pub fn remove_user(&self, id: &ids::UserId) {
        self.users.lock().unwrap().remove(id);
    }

    pub fn set_active(&self, id: &ids::UserId, active: bool) {
        if let Some(found) = self.users.lock().unwrap().get_mut(id) {
            found.status.active = active;
        }
    }

    pub fn set_deleted(&self, id: &ids::UserId, deleted: bool) {
        if let Some(found) = self.users.lock().unwrap().get_mut(id) {
            found.status.deleted = deleted;
        }
    }

    pub fn add_session(&self, token: &str, user_id: &ids::UserId, expires_in: chrono::Duration) {
        let now = Utc::now();
        let token_hash = session::hash_token(token);

        self.sessions.lock().unwrap().insert(token_hash, Session {
            user_id: *user_id,
            dropped: false,
            expires: now + expires_in,
        });
    }

    /// an existing group without members
    pub fn add_group(&self, name: &str) {
        let now = Utc::now();
        let author = ids::from_name("someone");

        self.groups.lock().unwrap().push(Group {
            id: ids::from_name(name),
            name: name.to_owned(),
            deleted: false,
            created: now,
            modified: now,
            created_by: author,
            modified_by: author,
            groups_users: Vec::new(),
        });
    }

    pub fn set_save_mode(&self, mode: SaveMode) {
        *self.save_mode.lock().unwrap() = mode;
    }

    pub fn groups(&self) -> Vec<Group> {
        self.groups.lock().unwrap().clone()
    }

    pub fn emails(&self) -> Vec<QueuedEmail> {
        self.emails.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserStore for Memory {
    async fn retrieve_status(
        &self,
        ids: &[ids::UserId]
    ) -> Result<HashMap<ids::UserId, UserStatus>, StoreError> {
        let users = self.users.lock().unwrap();

        Ok(ids.iter()
            .filter_map(|id| users.get(id))
            .map(|found| (found.status.id, found.status.clone()))
            .collect())
    }

    async fn email_context(
        &self,
        id: &ids::UserId
    ) -> Result<Option<EmailContext>, StoreError> {
        Ok(self.users.lock()
            .unwrap()
            .get(id)
            .map(|found| found.context.clone()))
    }
}

#[async_trait]
impl GroupStore for Memory {
    async fn name_taken(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.groups.lock()
            .unwrap()
            .iter()
            .any(|group| !group.deleted && group.name == name))
    }

    async fn save(&self, new_group: &NewGroup) -> Result<SaveOutcome, StoreError> {
        let mode = *self.save_mode.lock().unwrap();

        match mode {
            SaveMode::NotSaved => Ok(SaveOutcome::NotSaved),
            SaveMode::Violate { constraint, member } => {
                match group::constraint_errors(constraint, member) {
                    Some(errors) => Ok(SaveOutcome::Rejected(errors)),
                    None => panic!("no errors for constraint {constraint} {member:?}"),
                }
            },
            SaveMode::Store => {
                let mut groups = self.groups.lock().unwrap();

                if groups.iter().any(|group| !group.deleted && group.name == new_group.name()) {
                    return Ok(SaveOutcome::Rejected(group::name_taken_errors()));
                }

                let created = Group::create(new_group);
                groups.push(created.clone());

                Ok(SaveOutcome::Saved(created))
            }
        }
    }
}

#[async_trait]
impl SessionStore for Memory {
    async fn retrieve_session(&self, token_hash: &TokenHash) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.lock().unwrap().get(token_hash).cloned())
    }

    async fn retrieve_user(&self, user_id: &ids::UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock()
            .unwrap()
            .get(user_id)
            .filter(|found| found.status.active && !found.status.deleted)
            .map(|found| found.user.clone()))
    }
}

#[async_trait]
impl EmailQueue for Memory {
    async fn enqueue(&self, email: QueuedEmail) -> Result<(), StoreError> {
        self.emails.lock().unwrap().push(email);

        Ok(())
    }
}

pub struct RecordingListener {
    events: Mutex<Vec<GroupAdded>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        RecordingListener {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<GroupAdded> {
        self.events.lock().unwrap().clone()
    }

    pub fn usernames(&self) -> Vec<String> {
        self.events.lock()
            .unwrap()
            .iter()
            .map(|added| added.user.username.clone())
            .collect()
    }
}

#[async_trait]
impl Listener for RecordingListener {
    async fn handle(&self, event: &Event) -> error::Result<()> {
        let Event::GroupAdded(added) = event;

        self.events.lock().unwrap().push(added.clone());

        Ok(())
    }
}

pub struct FailingListener;

#[async_trait]
impl Listener for FailingListener {
    async fn handle(&self, _event: &Event) -> error::Result<()> {
        Err(error::Error::new().context("listener failed"))
    }
}

fn memory_store(memory: &Arc<Memory>) -> Store {
    Store {
        users: memory.clone(),
        groups: memory.clone(),
        sessions: memory.clone(),
        emails: memory.clone(),
    }
}

fn email_listener(store: &Store) -> Arc<GroupUserAddEmail> {
    let templates = Arc::new(Templates::new().unwrap());

    Arc::new(GroupUserAddEmail::new(templates, store.emails.clone()))
}

/// server state backed by `memory` with the email listener and a recorder
/// registered
pub fn state(memory: Arc<Memory>) -> (ArcShared, Arc<RecordingListener>) {
    let store = memory_store(&memory);
    let recorder = Arc::new(RecordingListener::new());
    let mut events = EventManager::new();

    events.on(GROUP_ADD_SUCCESS, email_listener(&store));
    events.on(GROUP_ADD_SUCCESS, recorder.clone());

    let shared = Shared::new(store, events, String::from("session_id"));

    (Arc::new(shared), recorder)
}

/// server state where every notification fails
pub fn failing_state(memory: Arc<Memory>) -> ArcShared {
    let store = memory_store(&memory);
    let mut events = EventManager::new();

    events.on(GROUP_ADD_SUCCESS, Arc::new(FailingListener));
    events.on(GROUP_ADD_SUCCESS, email_listener(&store));

    Arc::new(Shared::new(store, events, String::from("session_id")))
}
