use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use lockbox_lib::ids;
use serde::Serialize;

use crate::events::{Event, Listener};
use crate::net::error;
use crate::store::StoreError;
use crate::template::{self, Templates};
use crate::user::EmailContext;
use crate::user::group::Group;

#[derive(Debug, Clone)]
pub struct QueuedEmail {
    pub id: ids::EmailId,
    pub email: String,
    pub subject: String,
    pub template: String,
    pub body: String,
    pub locale: String,
    pub created: DateTime<Utc>,
}

impl QueuedEmail {
    pub fn new(email: String, subject: String, template: &str, body: String, locale: String) -> Self {
        QueuedEmail {
            id: ids::create_id(),
            email,
            subject,
            template: template.to_owned(),
            body,
            locale,
            created: Utc::now(),
        }
    }
}

/// emails waiting to be sent by the mailer
#[async_trait]
pub trait EmailQueue: Send + Sync {
    async fn enqueue(&self, email: QueuedEmail) -> Result<(), StoreError>;
}

pub struct PgEmailQueue {
    pool: Pool,
}

impl PgEmailQueue {
    pub fn new(pool: Pool) -> Self {
        PgEmailQueue {
            pool,
        }
    }
}

#[async_trait]
impl EmailQueue for PgEmailQueue {
    async fn enqueue(&self, email: QueuedEmail) -> Result<(), StoreError> {
        let conn = self.pool.get().await?;

        conn.execute(
            "\
            insert into email_queue (id, email, subject, template, body, locale, created) \
            values ($1, $2, $3, $4, $5, $6, $7)",
            &[
                &email.id,
                &email.email,
                &email.subject,
                &email.template,
                &email.body,
                &email.locale,
                &email.created,
            ]
        ).await?;

        Ok(())
    }
}

#[derive(Serialize)]
struct GroupUserAddData<'a> {
    user: &'a EmailContext,
    admin: &'a EmailContext,
    group: &'a Group,
}

/// tells a user that they were added to a group
pub struct GroupUserAddEmail {
    templates: Arc<Templates>,
    queue: Arc<dyn EmailQueue>,
}

impl GroupUserAddEmail {
    pub fn new(templates: Arc<Templates>, queue: Arc<dyn EmailQueue>) -> Self {
        GroupUserAddEmail {
            templates,
            queue,
        }
    }
}

#[async_trait]
impl Listener for GroupUserAddEmail {
    async fn handle(&self, event: &Event) -> error::Result<()> {
        let Event::GroupAdded(added) = event;

        let data = GroupUserAddData {
            user: &added.user,
            admin: &added.admin,
            group: &added.group,
        };

        let subject = self.templates.render(template::GROUP_USER_ADD_SUBJECT, &data)?;
        let body = self.templates.render(template::GROUP_USER_ADD, &data)?;

        tracing::debug!(
            email = added.user.username,
            group_id = %added.group.id,
            "queueing group user add email"
        );

        self.queue.enqueue(QueuedEmail::new(
            added.user.username.clone(),
            subject,
            template::GROUP_USER_ADD,
            body,
            added.user.locale.clone(),
        )).await?;

        Ok(())
    }
}
