//! Notification entity
//!
//! A null user_id denotes a broadcast addressed to every user; feed queries
//! must match `user_id = self OR user_id IS NULL`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    News,
    Announcement,
    Update,
    General,
}

impl From<String> for NotificationType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "news" => NotificationType::News,
            "announcement" => NotificationType::Announcement,
            "update" => NotificationType::Update,
            _ => NotificationType::General,
        }
    }
}

impl From<NotificationType> for String {
    fn from(kind: NotificationType) -> Self {
        match kind {
            NotificationType::News => "news".to_string(),
            NotificationType::Announcement => "announcement".to_string(),
            NotificationType::Update => "update".to_string(),
            NotificationType::General => "general".to_string(),
        }
    }
}

/// Notification priority
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl From<String> for Priority {
    fn from(s: String) -> Self {
        match s.as_str() {
            "high" => Priority::High,
            "medium" => Priority::Medium,
            _ => Priority::Low,
        }
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Low => "low".to_string(),
            Priority::Medium => "medium".to_string(),
            Priority::High => "high".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Addressee; None means broadcast to all users
    pub user_id: Option<Uuid>,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    #[sea_orm(column_name = "type", column_type = "Text")]
    pub kind: String,

    #[sea_orm(column_type = "Text")]
    pub priority: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Get the type as an enum
    pub fn notification_type(&self) -> NotificationType {
        NotificationType::from(self.kind.clone())
    }

    /// Check whether this notification is addressed to all users
    pub fn is_broadcast(&self) -> bool {
        self.user_id.is_none()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id"
    )]
    Addressee,
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_conversions() {
        assert_eq!(
            NotificationType::from("announcement".to_string()),
            NotificationType::Announcement
        );
        assert_eq!(
            NotificationType::from("mystery".to_string()),
            NotificationType::General
        );
        assert_eq!(String::from(NotificationType::Update), "update");
    }

    #[test]
    fn test_priority_conversions() {
        assert_eq!(Priority::from("high".to_string()), Priority::High);
        assert_eq!(Priority::from("unknown".to_string()), Priority::Low);
        assert_eq!(String::from(Priority::Medium), "medium");
    }
}
