use lockbox_lib::sec::role::Role;

use crate::net::error::{ApiError, AuthKind};
use crate::sec::authn::initiator::Initiator;

pub fn require_role(initiator: &Initiator, role: Role) -> Result<(), ApiError> {
    if initiator.user().role == role {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %initiator.user.id,
            role = %initiator.user.role,
            required = %role,
            "role check failed"
        );

        Err(ApiError::from(AuthKind::PermissionDenied))
    }
}

pub fn require_admin(initiator: &Initiator) -> Result<(), ApiError> {
    require_role(initiator, Role::Admin)
}

#[cfg(test)]
mod test {
    use super::*;

    use axum::http::StatusCode;

    use crate::net::error::ApiErrorKind;
    use crate::testing;

    #[test]
    fn only_admin() {
        assert!(require_admin(&testing::initiator("admin", Role::Admin)).is_ok());

        for role in [Role::User, Role::Guest, Role::Root] {
            let err = require_admin(&testing::initiator("someone", role)).unwrap_err();

            assert_eq!(err.status(), StatusCode::FORBIDDEN);
            assert_eq!(err.kind(), &ApiErrorKind::from(AuthKind::PermissionDenied));
        }
    }
}
