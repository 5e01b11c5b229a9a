//! SeaORM entity models
//!
//! Database entities for the ECE-Vision Hub portal

mod achievement;
mod connection;
mod help_query;
mod idea;
mod news;
mod notification;
mod password_reset;
mod profile;
mod suggestion;
mod suggestion_upvote;
mod upvote;

pub use profile::{
    Entity as ProfileEntity,
    Model as Profile,
    ActiveModel as ProfileActiveModel,
    Column as ProfileColumn,
    UserRole,
};

pub use idea::{
    Entity as IdeaEntity,
    Model as Idea,
    ActiveModel as IdeaActiveModel,
    Column as IdeaColumn,
    IdeaStatus,
};

pub use upvote::{
    Entity as UpvoteEntity,
    Model as Upvote,
    ActiveModel as UpvoteActiveModel,
    Column as UpvoteColumn,
};

pub use suggestion::{
    Entity as SuggestionEntity,
    Model as Suggestion,
    ActiveModel as SuggestionActiveModel,
    Column as SuggestionColumn,
};

pub use suggestion_upvote::{
    Entity as SuggestionUpvoteEntity,
    Model as SuggestionUpvote,
    ActiveModel as SuggestionUpvoteActiveModel,
    Column as SuggestionUpvoteColumn,
};

pub use connection::{
    Entity as ConnectionEntity,
    Model as Connection,
    ActiveModel as ConnectionActiveModel,
    Column as ConnectionColumn,
};

pub use notification::{
    Entity as NotificationEntity,
    Model as Notification,
    ActiveModel as NotificationActiveModel,
    Column as NotificationColumn,
    NotificationType,
    Priority,
};

pub use news::{
    Entity as NewsEntity,
    Model as News,
    ActiveModel as NewsActiveModel,
    Column as NewsColumn,
};

pub use achievement::{
    Entity as AchievementEntity,
    Model as Achievement,
    ActiveModel as AchievementActiveModel,
    Column as AchievementColumn,
};

pub use help_query::{
    Entity as HelpQueryEntity,
    Model as HelpQuery,
    ActiveModel as HelpQueryActiveModel,
    Column as HelpQueryColumn,
    QueryStatus,
};

pub use password_reset::{
    Entity as PasswordResetEntity,
    Model as PasswordReset,
    ActiveModel as PasswordResetActiveModel,
    Column as PasswordResetColumn,
};
