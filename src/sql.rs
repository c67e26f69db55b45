use tokio_postgres::{Error as PgError};
use tokio_postgres::error::SqlState;

/// name of the unique or foreign key constraint that rejected the statement
pub fn violated_constraint(error: &PgError) -> Option<&str> {
    let db_error = error.as_db_error()?;

    constraint_for(db_error.code(), db_error.constraint())
}

fn constraint_for<'a>(code: &SqlState, constraint: Option<&'a str>) -> Option<&'a str> {
    if *code == SqlState::UNIQUE_VIOLATION || *code == SqlState::FOREIGN_KEY_VIOLATION {
        constraint
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn constraint_violations() {
        assert_eq!(
            constraint_for(&SqlState::UNIQUE_VIOLATION, Some("groups_name_key")),
            Some("groups_name_key")
        );
        assert_eq!(
            constraint_for(&SqlState::FOREIGN_KEY_VIOLATION, Some("groups_users_user_id_fkey")),
            Some("groups_users_user_id_fkey")
        );
    }

    #[test]
    fn other_states_are_ignored() {
        for code in [
            SqlState::NOT_NULL_VIOLATION,
            SqlState::CHECK_VIOLATION,
            SqlState::T_R_SERIALIZATION_FAILURE,
        ] {
            assert_eq!(constraint_for(&code, Some("groups_name_key")), None, "{code:?}");
        }

        assert_eq!(constraint_for(&SqlState::UNIQUE_VIOLATION, None), None);
    }
}
