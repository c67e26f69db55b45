use std::sync::Arc;

use deadpool_postgres::Pool;

use crate::net::error;
use crate::user::{UserStore, PgUsers};
use crate::user::group::{GroupStore, PgGroups};
use crate::sec::authn::session::{SessionStore, PgSessions};
use crate::email::{EmailQueue, PgEmailQueue};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error(transparent)]
    Database(#[from] tokio_postgres::Error),
}

impl From<StoreError> for error::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Pool(err) => err.into(),
            StoreError::Database(err) => err.into(),
        }
    }
}

/// the storage backends used by the request handlers
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserStore>,
    pub groups: Arc<dyn GroupStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub emails: Arc<dyn EmailQueue>,
}

impl Store {
    pub fn postgres(pool: Pool, default_locale: String) -> Self {
        Store {
            users: Arc::new(PgUsers::new(pool.clone(), default_locale)),
            groups: Arc::new(PgGroups::new(pool.clone())),
            sessions: Arc::new(PgSessions::new(pool.clone())),
            emails: Arc::new(PgEmailQueue::new(pool)),
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}
