//! In-app notification service
//!
//! Stock saves notify the department manager and every super-admin. The
//! manager is notified first and a failure there is only logged. Super-admins
//! are then notified concurrently and any failure fails the whole step.

use std::fmt::Display;
use std::future::Future;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use shared::{AuthContext, UserRole};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Notification;
use crate::services::UserService;

/// Notification service for managing notifications
#[derive(Clone)]
pub struct NotificationService {
    db: PgPool,
}

/// Query options for listing notifications
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
}

/// Who was reached by a fan-out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FanOutReport {
    pub manager_notified: bool,
    pub admins_notified: usize,
}

/// Deliver to the manager first, then to all admins concurrently.
///
/// A manager failure is logged and reported as `manager_notified = false`.
/// The first admin failure is returned as the error.
pub async fn fan_out<F, Fut, E>(
    manager: Option<Uuid>,
    admins: &[Uuid],
    send: F,
) -> Result<FanOutReport, E>
where
    F: Fn(Uuid) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let mut report = FanOutReport::default();

    if let Some(manager_id) = manager {
        match send(manager_id).await {
            Ok(()) => report.manager_notified = true,
            Err(e) => tracing::warn!("Failed to notify manager {}: {}", manager_id, e),
        }
    }

    try_join_all(admins.iter().map(|&admin_id| send(admin_id))).await?;
    report.admins_notified = admins.len();

    Ok(report)
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Store one notification
    pub async fn create(
        &self,
        from_user: Option<Uuid>,
        to_user: Uuid,
        message: &str,
    ) -> AppResult<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (from_user, to_user, message)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(from_user)
        .bind(to_user)
        .bind(message)
        .fetch_one(&self.db)
        .await?;

        Ok(notification)
    }

    /// Tell the caller's department manager and all super-admins about a
    /// stock change
    pub async fn notify_stock_change(
        &self,
        actor: &AuthContext,
        message: &str,
    ) -> AppResult<FanOutReport> {
        let users = UserService::new(self.db.clone());

        // Without a department there is no manager to tell
        let manager = match actor.department_id {
            Some(department_id) => users
                .ids_with_role(UserRole::Manager, Some(department_id))
                .await?
                .into_iter()
                .find(|&id| id != actor.user_id),
            None => None,
        };

        let admins: Vec<Uuid> = users
            .ids_with_role(UserRole::SuperAdmin, None)
            .await?
            .into_iter()
            .filter(|&id| id != actor.user_id)
            .collect();

        let report = fan_out(manager, &admins, |to_user| async move {
            self.create(Some(actor.user_id), to_user, message)
                .await
                .map(|_| ())
        })
        .await?;

        tracing::debug!(
            manager_notified = report.manager_notified,
            admins = report.admins_notified,
            "Stock change notifications sent"
        );

        Ok(report)
    }

    /// Get notifications for a user, newest first
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        query: &NotificationQuery,
    ) -> AppResult<Vec<Notification>> {
        let limit = query.limit.unwrap_or(50).clamp(1, 200);

        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE to_user = $1 AND ($2 = false OR status = 'unread')
            ORDER BY date DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(query.unread_only)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(notifications)
    }

    /// Get unread notification count
    pub async fn get_unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE to_user = $1 AND status = 'unread'",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    /// Mark notification as read
    pub async fn mark_as_read(&self, user_id: Uuid, notification_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE notifications SET status = 'read' WHERE id = $1 AND to_user = $2",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Notification".to_string()));
        }

        Ok(())
    }

    /// Mark all notifications as read
    pub async fn mark_all_as_read(&self, user_id: Uuid) -> AppResult<i64> {
        let result = sqlx::query(
            "UPDATE notifications SET status = 'read' WHERE to_user = $1 AND status = 'unread'",
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> Arc<Mutex<Vec<Uuid>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test]
    async fn test_manager_notified_before_admins() {
        let manager = Uuid::new_v4();
        let admins = vec![Uuid::new_v4(), Uuid::new_v4()];
        let sent = recorder();

        let report = fan_out(Some(manager), &admins, |id| {
            let sent = sent.clone();
            async move {
                sent.lock().unwrap().push(id);
                Ok::<(), String>(())
            }
        })
        .await
        .unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0], manager);
        assert_eq!(sent.len(), 3);
        assert_eq!(report, FanOutReport { manager_notified: true, admins_notified: 2 });
    }

    #[tokio::test]
    async fn test_manager_failure_is_not_fatal() {
        let manager = Uuid::new_v4();
        let admins = vec![Uuid::new_v4()];

        let report = fan_out(Some(manager), &admins, |id| async move {
            if id == manager {
                Err("manager inbox unavailable".to_string())
            } else {
                Ok(())
            }
        })
        .await
        .unwrap();

        assert!(!report.manager_notified);
        assert_eq!(report.admins_notified, 1);
    }

    #[tokio::test]
    async fn test_admin_failure_is_fatal() {
        let failing = Uuid::new_v4();
        let admins = vec![Uuid::new_v4(), failing];

        let result = fan_out(None, &admins, |id| async move {
            if id == failing {
                Err("insert failed".to_string())
            } else {
                Ok(())
            }
        })
        .await;

        assert_eq!(result.unwrap_err(), "insert failed");
    }

    #[tokio::test]
    async fn test_no_recipients() {
        let report = fan_out(None, &[], |_| async { Ok::<(), String>(()) }).await.unwrap();
        assert_eq!(report, FanOutReport::default());
    }
}
