//! Notification fan-out for user actions
//!
//! [`plan`] is the pure rule table: given who acted and what they did, it
//! returns the notification to record, if any. [`NotificationDispatcher`]
//! resolves the actor and recipient, applies the plan and persists the
//! result. Dispatch failures are logged and swallowed so they never fail the
//! action that triggered them.

use crate::db::{Comment, NewNotification, Notification, NotificationKind, Resource, Store};
use tracing::{debug, warn};
use uuid::Uuid;

/// The user performing an action
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
}

/// An action that may notify someone
#[derive(Debug, Clone, Copy)]
pub enum Trigger<'a> {
    /// `reply` was posted under `parent`
    Reply {
        parent: &'a Comment,
        reply: &'a Comment,
    },
    /// A new like on `resource` (never an un-like)
    ResourceLike { resource: &'a Resource },
    /// A new like on `comment` (never an un-like)
    CommentLike { comment: &'a Comment },
    /// `resource` was sent to `recipient_id`
    Share {
        resource: &'a Resource,
        recipient_id: Uuid,
    },
}

impl Trigger<'_> {
    pub fn recipient(&self) -> Uuid {
        match self {
            Trigger::Reply { parent, .. } => parent.user_id,
            Trigger::ResourceLike { resource } => resource.user_id,
            Trigger::CommentLike { comment } => comment.user_id,
            Trigger::Share { recipient_id, .. } => *recipient_id,
        }
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            Trigger::Reply { .. } => NotificationKind::Reply,
            Trigger::ResourceLike { .. } => NotificationKind::Like,
            Trigger::CommentLike { .. } => NotificationKind::CommentLike,
            Trigger::Share { .. } => NotificationKind::Share,
        }
    }

    /// Shares target a user deliberately; every other kind skips self-actions
    fn suppressed_for(&self, actor_id: Uuid) -> bool {
        !matches!(self, Trigger::Share { .. }) && self.recipient() == actor_id
    }
}

/// Decide the notification for `trigger`, or `None` when it is suppressed
pub fn plan(actor: &Actor, trigger: &Trigger<'_>) -> Option<NewNotification> {
    if trigger.suppressed_for(actor.id) {
        return None;
    }

    let (message, resource_id, comment_id) = match trigger {
        Trigger::Reply { reply, .. } => (
            "replied to your comment.".to_string(),
            reply.resource_id,
            Some(reply.id),
        ),
        Trigger::ResourceLike { resource } => (
            format!("liked your resource '{}'.", resource.title),
            resource.id,
            None,
        ),
        Trigger::CommentLike { comment } => (
            "liked your comment.".to_string(),
            comment.resource_id,
            Some(comment.id),
        ),
        Trigger::Share { resource, .. } => (
            format!("shared the resource '{}' with you.", resource.title),
            resource.id,
            None,
        ),
    };

    Some(NewNotification {
        recipient_id: trigger.recipient(),
        actor_name: actor.name.clone(),
        kind: trigger.kind(),
        message,
        resource_id,
        comment_id,
    })
}

/// Best-effort notification writer
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    store: Store,
}

impl NotificationDispatcher {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Record the notification for `trigger` performed by `actor_id`
    ///
    /// Returns the stored notification, or `None` when it was suppressed or
    /// could not be recorded (unknown actor or recipient, storage failure).
    pub async fn dispatch(&self, actor_id: Uuid, trigger: Trigger<'_>) -> Option<Notification> {
        let kind = trigger.kind();
        if trigger.suppressed_for(actor_id) {
            debug!(actor_id = %actor_id, kind = ?kind, "Self-action, no notification");
            return None;
        }

        let actor = match self.store.find_user_by_id(actor_id).await {
            Ok(Some(user)) => Actor {
                id: user.id,
                name: user.name,
            },
            Ok(None) => {
                warn!(actor_id = %actor_id, kind = ?kind, "Notification skipped: actor not found");
                return None;
            }
            Err(e) => {
                warn!(actor_id = %actor_id, kind = ?kind, error = %e, "Notification skipped: actor lookup failed");
                return None;
            }
        };

        let recipient_id = trigger.recipient();
        match self.store.find_user_by_id(recipient_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!(recipient_id = %recipient_id, kind = ?kind, "Notification skipped: recipient not found");
                return None;
            }
            Err(e) => {
                warn!(recipient_id = %recipient_id, kind = ?kind, error = %e, "Notification skipped: recipient lookup failed");
                return None;
            }
        }

        let new_notification = plan(&actor, &trigger)?;
        match self.store.insert_notification(new_notification).await {
            Ok(notification) => {
                debug!(notification_id = %notification.id, recipient_id = %recipient_id, kind = ?kind, "Notification recorded");
                Some(notification)
            }
            Err(e) => {
                warn!(recipient_id = %recipient_id, kind = ?kind, error = %e, "Failed to record notification");
                None
            }
        }
    }
}
