use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Extension, State};
use axum::http::Uri;
use lockbox_api::{Envelope, Origin};
use lockbox_api::groups::CreateGroup;
use serde_json::Value;

use crate::net::error::{self, GroupKind};
use crate::net::layer::RequestId;
use crate::sec::authn::initiator::Initiator;
use crate::sec::authz::role::require_admin;
use crate::state::{Shared, ArcShared};
use crate::user::group::{self, GroupDraft, SaveOutcome};
use crate::user::group::notify::notify_members;

pub const ADD_SUCCESS_MSG: &str = "The group has been added successfully.";
pub const ADD_ACTION: &str = "groups.add";

/// bodies that are not valid json are treated as empty and fail validation
fn parse_body(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }

    match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!("request body is not valid json: {err}");

            Value::Null
        }
    }
}

/// creates a group and its members from a v1 request body then notifies
/// every member
pub async fn add_group(
    state: &Shared,
    initiator: &Initiator,
    body: &Value,
) -> error::Result<group::Group> {
    require_admin(initiator)?;

    let store = state.store();
    let data = CreateGroup::from_legacy(body);

    let new_group = GroupDraft::new(data, &initiator.user.id)
        .validate(store.groups.as_ref(), store.users.as_ref())
        .await?
        .guard()?;

    let created = match store.groups.save(&new_group).await? {
        SaveOutcome::Saved(created) => created,
        SaveOutcome::Rejected(errors) => {
            return Err(group::draft::validation_error(errors).into());
        },
        SaveOutcome::NotSaved => {
            return Err(error::Error::api(GroupKind::NotAdded));
        }
    };

    tracing::info!(
        group_id = %created.id,
        members = created.groups_users.len(),
        "group created"
    );

    let created = Arc::new(created);

    notify_members(
        store.users.as_ref(),
        state.events(),
        created.clone(),
        &initiator.user.id
    ).await?;

    Ok(Arc::try_unwrap(created).unwrap_or_else(|shared| (*shared).clone()))
}

/// the initiator is taken as a result so authentication failures get the
/// same envelope header as every other response for the request
pub async fn post(
    State(state): State<ArcShared>,
    initiator: Result<Initiator, error::Error>,
    request_id: Option<Extension<RequestId>>,
    uri: Uri,
    body: Bytes,
) -> error::Result<Envelope<lockbox_api::groups::Group>> {
    let origin = Origin::new(
        request_id.map(|Extension(rid)| *rid.id()),
        ADD_ACTION,
        uri.path()
    );

    let result = match initiator {
        Ok(initiator) => add_group(&state, &initiator, &parse_body(&body)).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(created) => Ok(
            Envelope::success(ADD_SUCCESS_MSG, lockbox_api::groups::Group::from(created))
                .with_origin(&origin)
        ),
        Err(err) => Err(err.origin(origin)),
    }
}
