//! Idea entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Idea moderation status
///
/// Two states only; approval is reversible and there is no rejected state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaStatus {
    Pending,
    Approved,
}

impl From<String> for IdeaStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "approved" => IdeaStatus::Approved,
            _ => IdeaStatus::Pending,
        }
    }
}

impl From<IdeaStatus> for String {
    fn from(status: IdeaStatus) -> Self {
        match status {
            IdeaStatus::Pending => "pending".to_string(),
            IdeaStatus::Approved => "approved".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ideas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning profile
    pub user_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    #[sea_orm(column_type = "Text")]
    pub category: String,

    pub skills: Vec<String>,

    pub links: Vec<String>,

    #[sea_orm(column_type = "Text")]
    pub status: String,

    /// Admin highlight flag, independent of status
    pub is_featured: bool,

    /// Denormalized count of upvote rows; kept in step transactionally
    pub upvotes: i32,

    pub views: i32,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Get the status as an enum
    pub fn idea_status(&self) -> IdeaStatus {
        IdeaStatus::from(self.status.clone())
    }

    /// Check whether the idea has been approved
    pub fn is_approved(&self) -> bool {
        self.idea_status() == IdeaStatus::Approved
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id"
    )]
    Owner,

    #[sea_orm(has_many = "super::suggestion::Entity")]
    Suggestions,

    #[sea_orm(has_many = "super::upvote::Entity")]
    Upvotes,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::suggestion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suggestions.def()
    }
}

impl Related<super::upvote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Upvotes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversions() {
        assert_eq!(IdeaStatus::from("approved".to_string()), IdeaStatus::Approved);
        assert_eq!(IdeaStatus::from("pending".to_string()), IdeaStatus::Pending);
        // Unknown statuses fall back to pending
        assert_eq!(IdeaStatus::from("rejected".to_string()), IdeaStatus::Pending);
        assert_eq!(String::from(IdeaStatus::Approved), "approved");
    }
}
