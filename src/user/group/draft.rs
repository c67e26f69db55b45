use std::collections::HashSet;

use lockbox_api::groups::CreateGroup;
use lockbox_api::{ApiError, ValidationErrors};
use lockbox_lib::groups::name_check;
use lockbox_lib::ids;
use lockbox_lib::validation::TextIssue;

use crate::store::StoreError;
use crate::user::UserStore;

use super::GroupStore;

pub const VALIDATION_MSG: &str = "Could not validate group data.";
pub const TABLE: &str = "groups";

pub const NAME_EMPTY_MSG: &str = "The name cannot be empty.";
pub const NAME_LENGTH_MSG: &str = "The name length should be maximum 255 characters.";
pub const NAME_UTF8_MSG: &str = "The name is not a valid utf8 string.";
pub const NAME_UNIQUE_MSG: &str = "The name is already used by another group.";

pub const USER_ID_EMPTY_MSG: &str = "The user identifier should not be empty.";
pub const USER_ID_UUID_MSG: &str = "The user identifier should be a valid UUID.";
pub const USER_EXISTS_MSG: &str = "The user does not exist.";
pub const USER_ACTIVE_MSG: &str = "The user is not active.";
pub const GROUP_USER_UNIQUE_MSG: &str = "The user is already a member of this group.";

/// a group as given by a client, not yet validated.
///
/// only the name and the members are taken from the client. the author
/// fields come from the acting user and everything else is assigned when
/// the group is saved
#[derive(Debug, Clone)]
pub struct GroupDraft {
    name: String,
    created_by: ids::UserId,
    modified_by: ids::UserId,
    groups_users: Vec<GroupUserDraft>,
}

#[derive(Debug, Clone)]
struct GroupUserDraft {
    user_id: String,
    is_admin: bool,
}

/// a group that passed validation. can only be created by
/// [`GroupDraft::validate`]
#[derive(Debug, Clone)]
pub struct NewGroup {
    name: String,
    created_by: ids::UserId,
    modified_by: ids::UserId,
    groups_users: Vec<NewGroupUser>,
}

#[derive(Debug, Clone)]
pub struct NewGroupUser {
    user_id: ids::UserId,
    is_admin: bool,
}

impl NewGroup {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_by(&self) -> &ids::UserId {
        &self.created_by
    }

    pub fn modified_by(&self) -> &ids::UserId {
        &self.modified_by
    }

    pub fn groups_users(&self) -> &[NewGroupUser] {
        &self.groups_users
    }
}

impl NewGroupUser {
    pub fn user_id(&self) -> &ids::UserId {
        &self.user_id
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}

#[derive(Debug)]
pub enum Checked {
    Valid(NewGroup),
    Invalid(ValidationErrors),
}

impl Checked {
    /// fails with the collected errors if there are any
    pub fn guard(self) -> Result<NewGroup, ApiError> {
        match self {
            Checked::Valid(new_group) => Ok(new_group),
            Checked::Invalid(errors) => Err(validation_error(errors)),
        }
    }
}

pub fn validation_error(errors: ValidationErrors) -> ApiError {
    ApiError::validation(VALIDATION_MSG, errors, TABLE)
}

impl GroupDraft {
    pub fn new(data: CreateGroup, acting: &ids::UserId) -> Self {
        GroupDraft {
            name: data.name,
            created_by: *acting,
            modified_by: *acting,
            groups_users: data.groups_users.into_iter()
                .map(|user| GroupUserDraft {
                    user_id: user.user_id,
                    is_admin: user.is_admin,
                })
                .collect(),
        }
    }

    fn name_errors(&self, errors: &mut ValidationErrors) -> bool {
        let Err(issue) = name_check(&self.name) else {
            return true;
        };

        match issue {
            TextIssue::Empty => errors.add("name", "_empty", NAME_EMPTY_MSG),
            TextIssue::TooLong => errors.add("name", "maxLength", NAME_LENGTH_MSG),
            TextIssue::Control => errors.add("name", "utf8Extended", NAME_UTF8_MSG),
        }

        false
    }

    /// runs the field rules on every member. members that fail them are
    /// returned as `None`
    fn member_errors(&self, errors: &mut ValidationErrors) -> Vec<Option<ids::UserId>> {
        let mut parsed = Vec::with_capacity(self.groups_users.len());

        for (index, user) in self.groups_users.iter().enumerate() {
            let mut row = ValidationErrors::new();

            if user.user_id.trim().is_empty() {
                row.add("user_id", "_empty", USER_ID_EMPTY_MSG);
                parsed.push(None);
            } else if let Some(id) = ids::parse(&user.user_id) {
                parsed.push(Some(id));
            } else {
                row.add("user_id", "uuid", USER_ID_UUID_MSG);
                parsed.push(None);
            }

            errors.nest("groups_users", index.to_string(), row);
        }

        parsed
    }

    /// checks the field rules of the group and every member, then the rules
    /// that need storage for the values that passed. all errors are
    /// collected before returning
    pub async fn validate(
        self,
        groups: &dyn GroupStore,
        users: &dyn UserStore,
    ) -> Result<Checked, StoreError> {
        let mut errors = ValidationErrors::new();

        if self.name_errors(&mut errors) && groups.name_taken(&self.name).await? {
            errors.add("name", "group_unique", NAME_UNIQUE_MSG);
        }

        let parsed = self.member_errors(&mut errors);
        let lookup: Vec<ids::UserId> = parsed.iter()
            .flatten()
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let statuses = if lookup.is_empty() {
            Default::default()
        } else {
            users.retrieve_status(&lookup).await?
        };

        let mut seen = HashSet::with_capacity(lookup.len());
        let mut groups_users = Vec::with_capacity(parsed.len());

        for (index, (maybe_id, draft)) in parsed.into_iter()
            .zip(self.groups_users.iter())
            .enumerate()
        {
            let Some(user_id) = maybe_id else {
                continue;
            };

            let mut row = ValidationErrors::new();

            if !seen.insert(user_id) {
                row.add("user_id", "group_user_unique", GROUP_USER_UNIQUE_MSG);
            } else {
                match statuses.get(&user_id) {
                    None => row.add("user_id", "user_exists", USER_EXISTS_MSG),
                    Some(status) if status.deleted => {
                        row.add("user_id", "user_is_not_soft_deleted", USER_EXISTS_MSG)
                    },
                    Some(status) if !status.active => {
                        row.add("user_id", "user_is_active", USER_ACTIVE_MSG)
                    },
                    Some(_) => {}
                }
            }

            if row.is_empty() {
                groups_users.push(NewGroupUser {
                    user_id,
                    is_admin: draft.is_admin,
                });
            } else {
                errors.nest("groups_users", index.to_string(), row);
            }
        }

        if !errors.is_empty() {
            return Ok(Checked::Invalid(errors));
        }

        Ok(Checked::Valid(NewGroup {
            name: self.name,
            created_by: self.created_by,
            modified_by: self.modified_by,
            groups_users,
        }))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use lockbox_api::groups::CreateGroupUser;
    use lockbox_lib::sec::role::Role;

    use crate::testing::Memory;

    fn create(name: &str, users: &[(&str, bool)]) -> CreateGroup {
        CreateGroup {
            name: name.to_owned(),
            groups_users: users.iter()
                .map(|(user_id, is_admin)| CreateGroupUser {
                    user_id: (*user_id).to_owned(),
                    is_admin: *is_admin,
                })
                .collect()
        }
    }

    async fn check(memory: &Memory, data: CreateGroup) -> Checked {
        let admin = memory.add_user("admin", Role::Admin);

        GroupDraft::new(data, &admin)
            .validate(memory, memory)
            .await
            .unwrap()
    }

    fn invalid(checked: Checked) -> ValidationErrors {
        match checked {
            Checked::Invalid(errors) => errors,
            Checked::Valid(new_group) => panic!("group passed validation {new_group:#?}"),
        }
    }

    #[tokio::test]
    async fn valid_group() {
        let memory = Memory::new();
        let ada = memory.add_user("ada", Role::User);
        let grace = memory.add_user("grace", Role::User);
        let admin = memory.add_user("admin", Role::Admin);

        let data = create("Freelancer", &[
            (&ada.to_string(), true),
            (&grace.to_string(), false),
        ]);

        let Checked::Valid(new_group) = GroupDraft::new(data, &admin)
            .validate(&memory, &memory)
            .await
            .unwrap() else {
            panic!("group failed validation");
        };

        assert_eq!(new_group.name(), "Freelancer");
        assert_eq!(new_group.created_by(), &admin);
        assert_eq!(new_group.modified_by(), &admin);

        let members: Vec<(ids::UserId, bool)> = new_group.groups_users()
            .iter()
            .map(|user| (*user.user_id(), user.is_admin()))
            .collect();

        assert_eq!(members, vec![(ada, true), (grace, false)]);
    }

    #[tokio::test]
    async fn no_members() {
        let memory = Memory::new();

        let Checked::Valid(new_group) = check(&memory, create("Freelancer", &[])).await else {
            panic!("group failed validation");
        };

        assert!(new_group.groups_users().is_empty());
    }

    #[tokio::test]
    async fn name_rules() {
        let memory = Memory::new();
        let cases = [
            (String::new(), "_empty"),
            (String::from("   "), "_empty"),
            (lockbox_lib::string_to_len(256), "maxLength"),
            (String::from("bad\u{0007}name"), "utf8Extended"),
        ];

        for (name, rule) in cases {
            let errors = invalid(check(&memory, create(&name, &[])).await);

            assert!(errors.contains(&["name", rule]), "{name:?} missing {rule}: {errors}");
        }
    }

    #[tokio::test]
    async fn name_taken() {
        let memory = Memory::new();
        memory.add_group("Freelancer");

        let errors = invalid(check(&memory, create("Freelancer", &[])).await);

        assert_eq!(
            errors.get(&["name", "group_unique"]).and_then(|node| node.message()),
            Some(NAME_UNIQUE_MSG)
        );
    }

    #[tokio::test]
    async fn member_rules() {
        let memory = Memory::new();
        let ada = memory.add_user("ada", Role::User).to_string();
        let inactive = memory.add_user("inactive", Role::User);
        let deleted = memory.add_user("deleted", Role::User);
        let unknown = ids::from_name("nobody").to_string();

        memory.set_active(&inactive, false);
        memory.set_deleted(&deleted, true);

        let data = create("Freelancer", &[
            (&ada, false),
            ("", false),
            ("not-a-uuid", false),
            (&unknown, false),
            (&inactive.to_string(), false),
            (&deleted.to_string(), false),
            (&ada, true),
        ]);

        let errors = invalid(check(&memory, data).await);
        let expected = [
            ("1", "_empty"),
            ("2", "uuid"),
            ("3", "user_exists"),
            ("4", "user_is_active"),
            ("5", "user_is_not_soft_deleted"),
            ("6", "group_user_unique"),
        ];

        assert!(!errors.contains(&["groups_users", "0"]), "{errors}");
        assert!(!errors.has_field("name"));

        for (index, rule) in expected {
            assert!(
                errors.contains(&["groups_users", index, "user_id", rule]),
                "row {index} missing {rule}: {errors}"
            );
        }
    }

    #[tokio::test]
    async fn errors_aggregate() {
        let memory = Memory::new();

        let errors = invalid(check(&memory, create("", &[("nope", false)])).await);

        assert!(errors.contains(&["name", "_empty"]));
        assert!(errors.contains(&["groups_users", "0", "user_id", "uuid"]));
    }

    #[test]
    fn guard() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "_empty", NAME_EMPTY_MSG);

        let err = Checked::Invalid(errors.clone()).guard().unwrap_err();

        assert_eq!(err.status(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.message(), Some(VALIDATION_MSG));
        assert_eq!(err.errors(), Some(&errors));
        assert_eq!(err.detail(), Some(&lockbox_api::Detail::table(TABLE)));
    }
}
