use std::sync::Arc;

use lockbox_lib::ids;

use crate::events::{Event, EventManager, GroupAdded};
use crate::net::error::{self, Context};
use crate::user::UserStore;

use super::Group;

/// publishes one event for every member of a newly created group.
///
/// the acting admin is looked up once and every member is looked up on its
/// own, in the order of the membership rows
pub async fn notify_members(
    users: &dyn UserStore,
    events: &EventManager,
    group: Arc<Group>,
    admin_id: &ids::UserId,
) -> error::Result<()> {
    let admin = users.email_context(admin_id)
        .await?
        .context(format!("email context for admin {admin_id} not found"))?;
    let admin = Arc::new(admin);

    for group_user in &group.groups_users {
        let user = users.email_context(&group_user.user_id)
            .await?
            .context(format!("email context for user {} not found", group_user.user_id))?
            .with_group_user(group_user.clone());

        tracing::debug!(
            group_id = %group.id,
            user_id = %group_user.user_id,
            "group member added"
        );

        events.dispatch(&Event::GroupAdded(GroupAdded {
            user,
            admin: admin.clone(),
            group: group.clone(),
        })).await?;
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    use lockbox_lib::sec::role::Role;

    use crate::events::GROUP_ADD_SUCCESS;
    use crate::testing::{self, Memory, RecordingListener};

    #[tokio::test]
    async fn one_event_per_member() {
        let memory = Memory::new();
        let admin = memory.add_user("admin", Role::Admin);
        let ada = memory.add_user("ada", Role::User);
        let grace = memory.add_user("grace", Role::User);
        let recorder = Arc::new(RecordingListener::new());
        let mut events = EventManager::new();
        events.on(GROUP_ADD_SUCCESS, recorder.clone());

        let group = Arc::new(testing::saved_group(&memory, "Freelancer", &admin, &[
            (ada, true),
            (grace, false),
        ]).await);

        notify_members(&memory, &events, group.clone(), &admin).await.unwrap();

        let recorded = recorder.events();
        assert_eq!(recorded.len(), 2);

        for (added, expected) in recorded.iter().zip(group.groups_users.iter()) {
            assert_eq!(added.user.id, expected.user_id);
            assert_eq!(added.user.groups_users.as_ref().map(|row| row.id), Some(expected.id));
            assert_eq!(added.admin.id, admin);
            assert_eq!(added.group.id, group.id);
        }
    }

    #[tokio::test]
    async fn missing_email_context() {
        let memory = Memory::new();
        let admin = memory.add_user("admin", Role::Admin);
        let ada = memory.add_user("ada", Role::User);
        let events = EventManager::new();

        let group = Arc::new(testing::saved_group(&memory, "Freelancer", &admin, &[(ada, false)]).await);

        memory.remove_user(&ada);

        let err = notify_members(&memory, &events, group, &admin).await.unwrap_err();

        assert_eq!(err.inner().status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
