use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use lockbox_api::ValidationErrors;
use lockbox_lib::ids;
use serde::Serialize;

use crate::sql;
use crate::store::StoreError;

pub mod draft;
pub mod notify;

pub use draft::{GroupDraft, NewGroup};

/// unique index on the names of groups that are not deleted
pub const NAME_KEY: &str = "groups_name_key";
pub const USER_FKEY: &str = "groups_users_user_id_fkey";
pub const GROUP_USER_KEY: &str = "groups_users_group_user_key";

#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub id: ids::GroupId,
    pub name: String,
    pub deleted: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub created_by: ids::UserId,
    pub modified_by: ids::UserId,
    pub groups_users: Vec<GroupUser>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupUser {
    pub id: ids::GroupUserId,
    pub group_id: ids::GroupId,
    pub user_id: ids::UserId,
    pub is_admin: bool,
    pub created: DateTime<Utc>,
}

impl Group {
    /// assigns ids and timestamps to a validated group
    pub fn create(new_group: &NewGroup) -> Self {
        let id = ids::create_id();
        let now = Utc::now();

        Group {
            id,
            name: new_group.name().to_owned(),
            deleted: false,
            created: now,
            modified: now,
            created_by: *new_group.created_by(),
            modified_by: *new_group.modified_by(),
            groups_users: new_group.groups_users()
                .iter()
                .map(|user| GroupUser {
                    id: ids::create_id(),
                    group_id: id,
                    user_id: *user.user_id(),
                    is_admin: user.is_admin(),
                    created: now,
                })
                .collect(),
        }
    }
}

impl From<GroupUser> for lockbox_api::groups::GroupUser {
    fn from(user: GroupUser) -> Self {
        lockbox_api::groups::GroupUser {
            id: user.id,
            group_id: user.group_id,
            user_id: user.user_id,
            is_admin: user.is_admin,
            created: user.created,
        }
    }
}

impl From<Group> for lockbox_api::groups::Group {
    fn from(group: Group) -> Self {
        lockbox_api::groups::Group {
            id: group.id,
            name: group.name,
            deleted: group.deleted,
            created: group.created,
            modified: group.modified,
            created_by: group.created_by,
            modified_by: group.modified_by,
            groups_users: group.groups_users.into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

#[derive(Debug)]
pub enum SaveOutcome {
    Saved(Group),

    /// the storage refused the group, the errors are in the same shape as
    /// the ones produced by [`GroupDraft::validate`]
    Rejected(ValidationErrors),

    NotSaved,
}

#[async_trait]
pub trait GroupStore: Send + Sync {
    /// checks the names of groups that are not deleted
    async fn name_taken(&self, name: &str) -> Result<bool, StoreError>;

    /// saves the group and all of its members or nothing
    async fn save(&self, new_group: &NewGroup) -> Result<SaveOutcome, StoreError>;
}

pub fn name_taken_errors() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add("name", "group_unique", draft::NAME_UNIQUE_MSG);
    errors
}

pub fn member_errors(index: usize, rule: &str, msg: &str) -> ValidationErrors {
    let mut row = ValidationErrors::new();
    row.add("user_id", rule, msg);

    let mut errors = ValidationErrors::new();
    errors.nest("groups_users", index.to_string(), row);
    errors
}

/// validation errors for a constraint that rejected the insert of the group
/// (`member` is `None`) or of the member at the given index
pub fn constraint_errors(constraint: &str, member: Option<usize>) -> Option<ValidationErrors> {
    match (constraint, member) {
        (NAME_KEY, None) => Some(name_taken_errors()),
        (USER_FKEY, Some(index)) => Some(member_errors(
            index, "user_exists", draft::USER_EXISTS_MSG
        )),
        (GROUP_USER_KEY, Some(index)) => Some(member_errors(
            index, "group_user_unique", draft::GROUP_USER_UNIQUE_MSG
        )),
        _ => None,
    }
}

pub struct PgGroups {
    pool: Pool,
}

impl PgGroups {
    pub fn new(pool: Pool) -> Self {
        PgGroups {
            pool,
        }
    }
}

#[async_trait]
impl GroupStore for PgGroups {
    async fn name_taken(&self, name: &str) -> Result<bool, StoreError> {
        let conn = self.pool.get().await?;

        let row = conn.query_one(
            "select exists(select 1 from groups where name = $1 and deleted = false)",
            &[&name]
        ).await?;

        Ok(row.get(0))
    }

    async fn save(&self, new_group: &NewGroup) -> Result<SaveOutcome, StoreError> {
        let mut conn = self.pool.get().await?;
        let transaction = conn.transaction().await?;
        let group = Group::create(new_group);

        let result = transaction.execute(
            "\
            insert into groups (id, name, deleted, created, modified, created_by, modified_by) \
            values ($1, $2, $3, $4, $5, $6, $7)",
            &[
                &group.id,
                &group.name,
                &group.deleted,
                &group.created,
                &group.modified,
                &group.created_by,
                &group.modified_by,
            ]
        ).await;

        match result {
            Ok(1) => {},
            Ok(count) => {
                tracing::warn!("group insert affected {count} rows");

                return Ok(SaveOutcome::NotSaved);
            }
            Err(err) => {
                let rejected = sql::violated_constraint(&err)
                    .and_then(|constraint| constraint_errors(constraint, None));

                return match rejected {
                    Some(errors) => Ok(SaveOutcome::Rejected(errors)),
                    None => Err(err.into()),
                };
            }
        }

        for (index, group_user) in group.groups_users.iter().enumerate() {
            let result = transaction.execute(
                "\
                insert into groups_users (id, group_id, user_id, is_admin, created) \
                values ($1, $2, $3, $4, $5)",
                &[
                    &group_user.id,
                    &group_user.group_id,
                    &group_user.user_id,
                    &group_user.is_admin,
                    &group_user.created,
                ]
            ).await;

            // the transaction is aborted on the first failed statement so
            // only one rejection can be reported
            if let Err(err) = result {
                let rejected = sql::violated_constraint(&err)
                    .and_then(|constraint| constraint_errors(constraint, Some(index)));

                return match rejected {
                    Some(errors) => Ok(SaveOutcome::Rejected(errors)),
                    None => Err(err.into()),
                };
            }
        }

        transaction.commit().await?;

        Ok(SaveOutcome::Saved(group))
    }
}
