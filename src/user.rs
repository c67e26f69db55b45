use std::collections::HashMap;

use async_trait::async_trait;
use deadpool_postgres::{Pool, GenericClient};
use lockbox_lib::ids;
use lockbox_lib::sec::role::Role;
use serde::Serialize;
use tokio_postgres::Error as PgError;

use crate::store::StoreError;

pub mod group;

#[derive(Debug, Clone)]
pub struct User {
    pub id: ids::UserId,
    pub role: Role,
}

impl User {
    /// only active users that are not deleted are returned
    pub async fn retrieve_active(
        conn: &impl GenericClient,
        id: &ids::UserId,
    ) -> Result<Option<Self>, PgError> {
        Ok(conn.query_opt(
            "\
            select users.id, \
                   roles.name \
            from users \
            join roles on users.role_id = roles.id \
            where users.id = $1 and \
                  users.active = true and \
                  users.deleted = false",
            &[id]
        ).await?.map(|row| User {
            id: row.get(0),
            role: row.get(1),
        }))
    }
}

/// the state of a user that decides if it can be added to a group
#[derive(Debug, Clone, PartialEq)]
pub struct UserStatus {
    pub id: ids::UserId,
    pub active: bool,
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
}

/// the user data handed to email templates
#[derive(Debug, Clone, Serialize)]
pub struct EmailContext {
    pub id: ids::UserId,
    pub username: String,
    pub locale: String,
    pub profile: Profile,

    /// the membership a notification is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups_users: Option<group::GroupUser>,
}

impl EmailContext {
    pub fn with_group_user(mut self, group_user: group::GroupUser) -> Self {
        self.groups_users = Some(group_user);
        self
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// statuses of the requested users, unknown ids are left out
    async fn retrieve_status(
        &self,
        ids: &[ids::UserId]
    ) -> Result<HashMap<ids::UserId, UserStatus>, StoreError>;

    async fn email_context(
        &self,
        id: &ids::UserId
    ) -> Result<Option<EmailContext>, StoreError>;
}

pub struct PgUsers {
    pool: Pool,
    default_locale: String,
}

impl PgUsers {
    pub fn new(pool: Pool, default_locale: String) -> Self {
        PgUsers {
            pool,
            default_locale,
        }
    }
}

#[async_trait]
impl UserStore for PgUsers {
    async fn retrieve_status(
        &self,
        ids: &[ids::UserId]
    ) -> Result<HashMap<ids::UserId, UserStatus>, StoreError> {
        let conn = self.pool.get().await?;
        let rows = conn.query(
            "select id, active, deleted from users where id = any($1)",
            &[&ids]
        ).await?;

        let mut rtn = HashMap::with_capacity(rows.len());

        for row in rows {
            let status = UserStatus {
                id: row.get(0),
                active: row.get(1),
                deleted: row.get(2),
            };

            rtn.insert(status.id, status);
        }

        Ok(rtn)
    }

    async fn email_context(
        &self,
        id: &ids::UserId
    ) -> Result<Option<EmailContext>, StoreError> {
        let conn = self.pool.get().await?;

        Ok(conn.query_opt(
            "\
            select users.id, \
                   users.username, \
                   users.locale, \
                   profiles.first_name, \
                   profiles.last_name \
            from users \
            left join profiles on profiles.user_id = users.id \
            where users.id = $1",
            &[id]
        ).await?.map(|row| EmailContext {
            id: row.get(0),
            username: row.get(1),
            locale: row.get::<_, Option<String>>(2)
                .unwrap_or_else(|| self.default_locale.clone()),
            profile: Profile {
                first_name: row.get::<_, Option<String>>(3).unwrap_or_default(),
                last_name: row.get::<_, Option<String>>(4).unwrap_or_default(),
            },
            groups_users: None,
        }))
    }
}
