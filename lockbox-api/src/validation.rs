use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

/// field errors keyed by field name.
///
/// leaf entries are keyed by the name of the rule that failed and hold the
/// message for it. associated records nest under the field name and then the
/// position of the record, e.g.
///
/// ```json
/// {
///     "name": { "_empty": "The name cannot be empty." },
///     "groups_users": {
///         "1": { "user_id": { "user_exists": "The user does not exist." } }
///     }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, ErrorNode>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorNode {
    Message(String),
    Nested(ValidationErrors),
}

impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors(BTreeMap::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// records a failed rule for the given field
    pub fn add<F, R, M>(&mut self, field: F, rule: R, message: M)
    where
        F: Into<String>,
        R: Into<String>,
        M: Into<String>,
    {
        let rule = rule.into();
        let message = message.into();

        self.with_branch(field.into(), |branch| {
            branch.0.insert(rule, ErrorNode::Message(message));
        });
    }

    /// places the errors of an associated record under `field.key`. empty
    /// error sets are dropped
    pub fn nest<F, K>(&mut self, field: F, key: K, errors: ValidationErrors)
    where
        F: Into<String>,
        K: Into<String>,
    {
        if errors.is_empty() {
            return;
        }

        let key = key.into();

        self.with_branch(field.into(), |branch| {
            if let Some(ErrorNode::Nested(existing)) = branch.0.get_mut(&key) {
                existing.merge(errors);
            } else {
                branch.0.insert(key, ErrorNode::Nested(errors));
            }
        });
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (key, node) in other.0 {
            match node {
                ErrorNode::Nested(nested) => {
                    if let Some(ErrorNode::Nested(existing)) = self.0.get_mut(&key) {
                        existing.merge(nested);
                    } else {
                        self.0.insert(key, ErrorNode::Nested(nested));
                    }
                },
                message => {
                    self.0.insert(key, message);
                }
            }
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// walks the error tree, e.g. `["groups_users", "0", "user_id", "uuid"]`
    pub fn get(&self, path: &[&str]) -> Option<&ErrorNode> {
        let (first, rest) = path.split_first()?;
        let node = self.0.get(*first)?;

        if rest.is_empty() {
            return Some(node);
        }

        match node {
            ErrorNode::Nested(nested) => nested.get(rest),
            ErrorNode::Message(_) => None,
        }
    }

    pub fn contains(&self, path: &[&str]) -> bool {
        self.get(path).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ErrorNode)> {
        self.0.iter()
    }

    /// runs `update` on the nested set of `field`. a message stored under
    /// the field is replaced
    fn with_branch<F>(&mut self, field: String, update: F)
    where
        F: FnOnce(&mut ValidationErrors)
    {
        let mut branch = match self.0.remove(&field) {
            Some(ErrorNode::Nested(nested)) => nested,
            Some(ErrorNode::Message(_)) | None => ValidationErrors::new(),
        };

        update(&mut branch);

        self.0.insert(field, ErrorNode::Nested(branch));
    }
}

impl ErrorNode {
    pub fn message(&self) -> Option<&str> {
        match self {
            ErrorNode::Message(msg) => Some(msg.as_str()),
            ErrorNode::Nested(_) => None,
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;

        for (key, node) in &self.0 {
            if !first {
                write!(f, ",")?;
            }

            first = false;

            match node {
                ErrorNode::Message(_) => write!(f, "{}", key)?,
                ErrorNode::Nested(nested) => write!(f, "{}.{{{}}}", key, nested)?,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nested_errors_serialize_as_tree() {
        let mut row = ValidationErrors::new();
        row.add("user_id", "user_exists", "The user does not exist.");

        let mut errors = ValidationErrors::new();
        errors.add("name", "_empty", "The name cannot be empty.");
        errors.nest("groups_users", "1", row);

        let json = serde_json::to_value(&errors).unwrap();

        assert_eq!(json, serde_json::json!({
            "name": { "_empty": "The name cannot be empty." },
            "groups_users": {
                "1": { "user_id": { "user_exists": "The user does not exist." } }
            }
        }));

        let back: ValidationErrors = serde_json::from_value(json).unwrap();

        assert_eq!(back, errors);
    }

    #[test]
    fn empty_nested_sets_are_dropped() {
        let mut errors = ValidationErrors::new();
        errors.nest("groups_users", "0", ValidationErrors::new());

        assert!(errors.is_empty());
    }

    #[test]
    fn lookup_by_path() {
        let mut row = ValidationErrors::new();
        row.add("user_id", "uuid", "The user identifier should be a valid UUID.");

        let mut errors = ValidationErrors::new();
        errors.nest("groups_users", "3", row);

        assert!(errors.contains(&["groups_users", "3", "user_id", "uuid"]));
        assert!(!errors.contains(&["groups_users", "0"]));
        assert_eq!(
            errors.get(&["groups_users", "3", "user_id", "uuid"]).and_then(ErrorNode::message),
            Some("The user identifier should be a valid UUID.")
        );
    }

    #[test]
    fn rules_for_the_same_row_merge() {
        let mut first = ValidationErrors::new();
        first.add("user_id", "user_exists", "The user does not exist.");

        let mut second = ValidationErrors::new();
        second.add("user_id", "group_user_unique", "The user is already a member of this group.");

        let mut errors = ValidationErrors::new();
        errors.nest("groups_users", "2", first);
        errors.nest("groups_users", "2", second);

        assert!(errors.contains(&["groups_users", "2", "user_id", "user_exists"]));
        assert!(errors.contains(&["groups_users", "2", "user_id", "group_user_unique"]));
    }

    #[test]
    fn rule_under_a_message_field() {
        let mut errors: ValidationErrors = serde_json::from_value(serde_json::json!({
            "name": "flat message"
        })).unwrap();

        errors.add("name", "_empty", "The name cannot be empty.");

        assert_eq!(
            errors.get(&["name", "_empty"]).and_then(ErrorNode::message),
            Some("The name cannot be empty.")
        );
        assert_eq!(errors.len(), 1);
    }
}
