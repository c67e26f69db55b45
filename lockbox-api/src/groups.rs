use lockbox_lib::ids;

use serde::{Serialize, Deserialize};
use serde_json::Value;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupUser {
    pub id: ids::GroupUserId,
    pub group_id: ids::GroupId,
    pub user_id: ids::UserId,
    pub is_admin: bool,
    pub created: DateTime<Utc>,
}

/// group creation data in its internal shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateGroup {
    pub name: String,

    #[serde(default)]
    pub groups_users: Vec<CreateGroupUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateGroupUser {
    pub user_id: String,

    #[serde(default)]
    pub is_admin: bool,
}

impl CreateGroup {
    /// reads the v1 request body
    ///
    /// ```json
    /// {
    ///     "Group": { "name": "Freelancer" },
    ///     "GroupUsers": [
    ///         { "GroupUser": { "user_id": "...", "is_admin": 1 } }
    ///     ]
    /// }
    /// ```
    ///
    /// only `Group.name`, `GroupUser.user_id` and `GroupUser.is_admin` are
    /// read, anything else in the body is ignored. missing values fall back
    /// to an empty string or false and a malformed body never fails
    pub fn from_legacy(data: &Value) -> Self {
        let name = data.pointer("/Group/name")
            .map(loose_string)
            .unwrap_or_default();

        let groups_users = legacy_rows(data.get("GroupUsers"))
            .into_iter()
            .map(|row| CreateGroupUser {
                user_id: row.pointer("/GroupUser/user_id")
                    .map(loose_string)
                    .unwrap_or_default(),
                is_admin: row.pointer("/GroupUser/is_admin")
                    .map(loose_bool)
                    .unwrap_or(false),
            })
            .collect();

        CreateGroup {
            name,
            groups_users
        }
    }
}

/// v1 clients send the rows either as a list or as an object keyed by
/// position (`{"0": {...}, "1": {...}}`). keys that are not numbers are
/// skipped and the rest are taken in numeric order
fn legacy_rows(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(rows)) => rows.iter().collect(),
        Some(Value::Object(map)) => {
            let mut numbered: Vec<(u64, &Value)> = map.iter()
                .filter_map(|(key, row)| key.parse::<u64>().ok().map(|index| (index, row)))
                .collect();

            numbered.sort_by_key(|(index, _)| *index);

            numbered.into_iter()
                .map(|(_, row)| row)
                .collect()
        },
        _ => Vec::new(),
    }
}

/// scalars are taken as text, arrays and objects give an empty string
fn loose_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => if *b { String::from("1") } else { String::new() },
        Value::Null |
        Value::Array(_) |
        Value::Object(_) => String::new(),
    }
}

/// truthiness used by the v1 clients. "0" and "" are false, any other
/// string is true
fn loose_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(list) => !list.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Null => false,
    }
}

/// v1 request body, used by clients to build a create request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyCreateGroup {
    #[serde(rename = "Group")]
    pub group: LegacyGroup,

    #[serde(rename = "GroupUsers", default)]
    pub group_users: Vec<LegacyGroupUserRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyGroup {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyGroupUserRow {
    #[serde(rename = "GroupUser")]
    pub group_user: LegacyGroupUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyGroupUser {
    pub user_id: String,
    pub is_admin: bool,
}

impl LegacyCreateGroup {
    pub fn new<N>(name: N) -> Self
    where
        N: Into<String>
    {
        LegacyCreateGroup {
            group: LegacyGroup { name: name.into() },
            group_users: Vec::new(),
        }
    }

    pub fn with_user<U>(mut self, user_id: U, is_admin: bool) -> Self
    where
        U: Into<String>
    {
        self.group_users.push(LegacyGroupUserRow {
            group_user: LegacyGroupUser {
                user_id: user_id.into(),
                is_admin,
            }
        });
        self
    }
}
