use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use lockbox_lib::ids;

use crate::store::StoreError;
use crate::user::User;

pub type TokenHash = [u8; blake3::OUT_LEN];

/// session cookie values are never stored, only their hash
pub fn hash_token<T>(token: T) -> TokenHash
where
    T: AsRef<[u8]>
{
    *blake3::hash(token.as_ref()).as_bytes()
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: ids::UserId,
    pub dropped: bool,
    pub expires: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: &DateTime<Utc>) -> bool {
        self.dropped || self.expires < *now
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn retrieve_session(&self, token_hash: &TokenHash) -> Result<Option<Session>, StoreError>;

    /// the owner of a session if it is active and not deleted
    async fn retrieve_user(&self, user_id: &ids::UserId) -> Result<Option<User>, StoreError>;
}

pub struct PgSessions {
    pool: Pool,
}

impl PgSessions {
    pub fn new(pool: Pool) -> Self {
        PgSessions {
            pool,
        }
    }
}

#[async_trait]
impl SessionStore for PgSessions {
    async fn retrieve_session(&self, token_hash: &TokenHash) -> Result<Option<Session>, StoreError> {
        let conn = self.pool.get().await?;

        Ok(conn.query_opt(
            "\
            select sessions.user_id, \
                   sessions.dropped, \
                   sessions.expires \
            from sessions \
            where sessions.token_hash = $1",
            &[&token_hash.as_slice()]
        ).await?.map(|row| Session {
            user_id: row.get(0),
            dropped: row.get(1),
            expires: row.get(2),
        }))
    }

    async fn retrieve_user(&self, user_id: &ids::UserId) -> Result<Option<User>, StoreError> {
        let conn = self.pool.get().await?;

        Ok(User::retrieve_active(&conn, user_id).await?)
    }
}
