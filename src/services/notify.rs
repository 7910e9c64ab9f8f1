use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::notification::{self, Entity as NotificationEntity, NotificationKind};
use crate::error::ApiError;

/// Fire-and-forget push into the notification table. Delivery is best-effort;
/// a failed insert is logged and swallowed so it can never fail the operation
/// that triggered it.
pub async fn notify(
    db: &DatabaseConnection,
    user_id: i32,
    kind: NotificationKind,
    title: &str,
    message: &str,
    link: Option<String>,
) {
    let row = notification::ActiveModel {
        user_id: Set(user_id),
        kind: Set(kind),
        title: Set(title.to_string()),
        message: Set(message.to_string()),
        link: Set(link),
        read: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    if let Err(err) = row.insert(db).await {
        tracing::warn!(error = %err, user_id, "failed to deliver notification");
    }
}

pub async fn list_notifications(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<notification::Model>, ApiError> {
    let rows = NotificationEntity::find()
        .filter(notification::Column::UserId.eq(user_id))
        .order_by_desc(notification::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(rows)
}

pub async fn mark_read(
    db: &DatabaseConnection,
    user_id: i32,
    notification_id: i32,
) -> Result<(), ApiError> {
    let row = NotificationEntity::find_by_id(notification_id)
        .filter(notification::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("No notification with {} id was found", notification_id))
        })?;

    let mut row: notification::ActiveModel = row.into();
    row.read = Set(true);
    row.update(db).await?;
    Ok(())
}

pub async fn mark_all_read(db: &DatabaseConnection, user_id: i32) -> Result<u64, ApiError> {
    let result = NotificationEntity::update_many()
        .col_expr(notification::Column::Read, Expr::value(true))
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::Read.eq(false))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
