//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations with proper
//! error handling and transaction support. Write pairs that must stay
//! consistent (upvote row + counter, moderation change + owner
//! notification, cascade deletes) run inside a single database
//! transaction.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::FEED_NOTIFICATION_TYPES;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbBackend, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, Statement, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Filter predicate for idea listings
///
/// Search matches case-insensitively against title, description, or any
/// skill; category matches the idea category exactly or any skill. Applied
/// over the full ordered scan, matching the portal's unpaginated listing.
#[derive(Debug, Clone, Default)]
pub struct IdeaFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub featured_only: bool,
    pub approved_only: bool,
}

impl IdeaFilter {
    /// Check whether an idea passes this filter
    pub fn matches(&self, idea: &Idea) -> bool {
        if self.featured_only && !idea.is_featured {
            return false;
        }

        if self.approved_only && !idea.is_approved() {
            return false;
        }

        if let Some(ref term) = self.search {
            let needle = term.to_lowercase();
            if !needle.is_empty() {
                let hit = idea.title.to_lowercase().contains(&needle)
                    || idea.description.to_lowercase().contains(&needle)
                    || idea.skills.iter().any(|s| s.to_lowercase().contains(&needle));
                if !hit {
                    return false;
                }
            }
        }

        if let Some(ref category) = self.category {
            if !category.is_empty() && category != "all" {
                let hit = idea.category == *category || idea.skills.iter().any(|s| s == category);
                if !hit {
                    return false;
                }
            }
        }

        true
    }
}

/// Result of an idempotent idea upvote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpvoteOutcome {
    /// Whether a new upvote row was created by this call
    pub applied: bool,

    /// Upvote count after the operation
    pub upvotes: i32,
}

/// Result of a suggestion upvote toggle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleOutcome {
    /// Whether the caller holds an upvote after the operation
    pub upvoted: bool,

    /// Upvote count after the operation
    pub count: u64,
}

/// One suggestion in an idea's thread, with resolved display data
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionThreadEntry {
    pub suggestion: Suggestion,
    pub author_name: String,
    pub upvotes: u64,
    pub upvoter_names: Vec<String>,
    pub upvoted_by_caller: bool,
}

/// Entity counts for the admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardCounts {
    pub users: u64,
    pub ideas: u64,
    pub notifications: u64,
    pub news: u64,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Profile Operations
    // ========================================================================

    /// Create a new profile with role=student
    #[allow(clippy::too_many_arguments)]
    pub async fn create_profile(
        &self,
        email: String,
        password_hash: String,
        full_name: String,
        skills: Vec<String>,
        hall_ticket_number: Option<String>,
        mobile: Option<String>,
    ) -> Result<Profile> {
        if self.find_profile_by_email(&email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let now = chrono::Utc::now();

        let profile = ProfileActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(password_hash),
            full_name: Set(full_name),
            role: Set(String::from(UserRole::Student)),
            skills: Set(skills),
            hall_ticket_number: Set(hall_ticket_number),
            mobile: Set(mobile),
            is_blocked: Set(false),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        profile.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find profile by ID
    pub async fn find_profile_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
        ProfileEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find profile by email
    pub async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>> {
        ProfileEntity::find()
            .filter(ProfileColumn::Email.eq(email))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List all profiles, newest first
    pub async fn list_profiles(&self) -> Result<Vec<Profile>> {
        ProfileEntity::find()
            .order_by_desc(ProfileColumn::CreatedAt)
            .order_by_desc(ProfileColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Update a profile's editable fields
    pub async fn update_profile(
        &self,
        id: Uuid,
        full_name: String,
        skills: Vec<String>,
        hall_ticket_number: Option<String>,
        mobile: Option<String>,
    ) -> Result<Profile> {
        let mut profile: ProfileActiveModel = ProfileEntity::find_by_id(id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::ProfileNotFound { id: id.to_string() })?
            .into();

        profile.full_name = Set(full_name);
        profile.skills = Set(skills);
        profile.hall_ticket_number = Set(hall_ticket_number);
        profile.mobile = Set(mobile);
        profile.updated_at = Set(chrono::Utc::now().into());

        profile.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Update a profile's password hash
    pub async fn update_password(&self, id: Uuid, password_hash: String) -> Result<()> {
        let mut profile: ProfileActiveModel = ProfileEntity::find_by_id(id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::ProfileNotFound { id: id.to_string() })?
            .into();

        profile.password_hash = Set(password_hash);
        profile.updated_at = Set(chrono::Utc::now().into());
        profile.update(self.write_conn()).await?;
        Ok(())
    }

    /// Set or clear a profile's blocked flag
    pub async fn set_profile_blocked(&self, id: Uuid, blocked: bool) -> Result<Profile> {
        let mut profile: ProfileActiveModel = ProfileEntity::find_by_id(id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::ProfileNotFound { id: id.to_string() })?
            .into();

        profile.is_blocked = Set(blocked);
        profile.updated_at = Set(chrono::Utc::now().into());

        profile.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete a profile and every row it owns or authored
    ///
    /// Cascades: owned ideas (with their full dependent sets), authored
    /// upvotes (decrementing each idea's counter), authored suggestions and
    /// suggestion upvotes, connections in both directions, achievements,
    /// help queries, targeted notifications, and password resets.
    pub async fn delete_profile(&self, id: Uuid) -> Result<()> {
        let profile = self
            .find_profile_by_id(id)
            .await?
            .ok_or_else(|| AppError::ProfileNotFound { id: id.to_string() })?;

        let txn = self.write_conn().begin().await?;

        // Owned ideas and their dependents
        let owned_ideas: Vec<Uuid> = IdeaEntity::find()
            .filter(IdeaColumn::UserId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|idea| idea.id)
            .collect();

        for idea_id in &owned_ideas {
            delete_idea_dependents(&txn, *idea_id).await?;
        }

        IdeaEntity::delete_many()
            .filter(IdeaColumn::UserId.eq(id))
            .exec(&txn)
            .await?;

        // Upvotes authored on other users' ideas: keep their counters honest
        let authored_upvotes = UpvoteEntity::find()
            .filter(UpvoteColumn::UserId.eq(id))
            .all(&txn)
            .await?;

        for upvote in &authored_upvotes {
            decrement_idea_upvotes(&txn, upvote.idea_id).await?;
        }

        UpvoteEntity::delete_many()
            .filter(UpvoteColumn::UserId.eq(id))
            .exec(&txn)
            .await?;

        // Authored suggestion upvotes
        SuggestionUpvoteEntity::delete_many()
            .filter(SuggestionUpvoteColumn::UserId.eq(id))
            .exec(&txn)
            .await?;

        // Authored suggestions and the upvotes attached to them
        let authored_suggestions: Vec<Uuid> = SuggestionEntity::find()
            .filter(SuggestionColumn::UserId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();

        if !authored_suggestions.is_empty() {
            SuggestionUpvoteEntity::delete_many()
                .filter(SuggestionUpvoteColumn::SuggestionId.is_in(authored_suggestions))
                .exec(&txn)
                .await?;
        }

        SuggestionEntity::delete_many()
            .filter(SuggestionColumn::UserId.eq(id))
            .exec(&txn)
            .await?;

        // Follow edges in both directions
        ConnectionEntity::delete_many()
            .filter(
                Condition::any()
                    .add(ConnectionColumn::FollowerId.eq(id))
                    .add(ConnectionColumn::FollowingId.eq(id)),
            )
            .exec(&txn)
            .await?;

        AchievementEntity::delete_many()
            .filter(AchievementColumn::UserId.eq(id))
            .exec(&txn)
            .await?;

        HelpQueryEntity::delete_many()
            .filter(HelpQueryColumn::UserId.eq(id))
            .exec(&txn)
            .await?;

        NotificationEntity::delete_many()
            .filter(NotificationColumn::UserId.eq(id))
            .exec(&txn)
            .await?;

        PasswordResetEntity::delete_many()
            .filter(PasswordResetColumn::UserId.eq(id))
            .exec(&txn)
            .await?;

        ProfileEntity::delete_by_id(profile.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    // ========================================================================
    // Idea Operations
    // ========================================================================

    /// Create a new idea with status=pending
    pub async fn create_idea(
        &self,
        user_id: Uuid,
        title: String,
        description: String,
        category: String,
        skills: Vec<String>,
        links: Vec<String>,
    ) -> Result<Idea> {
        let now = chrono::Utc::now();

        let idea = IdeaActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            title: Set(title),
            description: Set(description),
            category: Set(category),
            skills: Set(skills),
            links: Set(links),
            status: Set(String::from(IdeaStatus::Pending)),
            is_featured: Set(false),
            upvotes: Set(0),
            views: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        idea.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find idea by ID
    pub async fn find_idea_by_id(&self, id: Uuid) -> Result<Option<Idea>> {
        IdeaEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List ideas passing the filter, newest first
    ///
    /// Full-scan semantics: every row is fetched and the filter predicate is
    /// applied in memory. Listings are unpaginated; acceptable at campus
    /// scale only.
    pub async fn list_ideas(&self, filter: &IdeaFilter) -> Result<Vec<Idea>> {
        let ideas = IdeaEntity::find()
            .order_by_desc(IdeaColumn::CreatedAt)
            .order_by_desc(IdeaColumn::Id)
            .all(self.read_conn())
            .await?;

        Ok(ideas.into_iter().filter(|idea| filter.matches(idea)).collect())
    }

    /// List ideas owned by a user, newest first
    pub async fn list_ideas_by_user(&self, user_id: Uuid) -> Result<Vec<Idea>> {
        IdeaEntity::find()
            .filter(IdeaColumn::UserId.eq(user_id))
            .order_by_desc(IdeaColumn::CreatedAt)
            .order_by_desc(IdeaColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List the most recent ideas
    pub async fn list_recent_ideas(&self, limit: u64) -> Result<Vec<Idea>> {
        IdeaEntity::find()
            .order_by_desc(IdeaColumn::CreatedAt)
            .order_by_desc(IdeaColumn::Id)
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Overwrite an idea's editable fields
    ///
    /// Never touches status: an owner edit does not re-queue moderation.
    pub async fn update_idea(
        &self,
        id: Uuid,
        title: String,
        description: String,
        category: String,
        skills: Vec<String>,
        links: Vec<String>,
    ) -> Result<Idea> {
        let mut idea: IdeaActiveModel = IdeaEntity::find_by_id(id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::IdeaNotFound { id: id.to_string() })?
            .into();

        idea.title = Set(title);
        idea.description = Set(description);
        idea.category = Set(category);
        idea.skills = Set(skills);
        idea.links = Set(links);
        idea.updated_at = Set(chrono::Utc::now().into());

        idea.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete an idea and its dependent rows (suggestion upvotes,
    /// suggestions, upvotes) in one transaction
    pub async fn delete_idea(&self, id: Uuid) -> Result<()> {
        let txn = self.write_conn().begin().await?;

        let idea = IdeaEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::IdeaNotFound { id: id.to_string() })?;

        delete_idea_dependents(&txn, idea.id).await?;
        IdeaEntity::delete_by_id(idea.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Record an upvote for a user on an idea (idempotent add)
    ///
    /// If the caller already holds an upvote row, nothing changes and the
    /// current count is returned. Otherwise the row insert and the counter
    /// increment commit together.
    pub async fn upvote_idea(&self, idea_id: Uuid, user_id: Uuid) -> Result<UpvoteOutcome> {
        let txn = self.write_conn().begin().await?;

        let idea = IdeaEntity::find_by_id(idea_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::IdeaNotFound { id: idea_id.to_string() })?;

        let existing = UpvoteEntity::find()
            .filter(UpvoteColumn::IdeaId.eq(idea_id))
            .filter(UpvoteColumn::UserId.eq(user_id))
            .one(&txn)
            .await?;

        if existing.is_some() {
            txn.commit().await?;
            return Ok(UpvoteOutcome {
                applied: false,
                upvotes: idea.upvotes,
            });
        }

        let now = chrono::Utc::now();
        let upvote = UpvoteActiveModel {
            id: Set(Uuid::new_v4()),
            idea_id: Set(idea_id),
            user_id: Set(user_id),
            created_at: Set(now.into()),
        };
        upvote.insert(&txn).await?;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE ideas SET upvotes = upvotes + 1, updated_at = NOW() WHERE id = $1",
            vec![idea_id.into()],
        );
        txn.execute(stmt).await?;

        txn.commit().await?;

        Ok(UpvoteOutcome {
            applied: true,
            upvotes: idea.upvotes + 1,
        })
    }

    // ========================================================================
    // Moderation Operations
    // ========================================================================

    /// Transition an idea between pending and approved
    ///
    /// A transition into approved notifies the owner inside the same
    /// transaction as the status write.
    pub async fn set_idea_status(&self, idea_id: Uuid, status: IdeaStatus) -> Result<Idea> {
        let txn = self.write_conn().begin().await?;

        let current = IdeaEntity::find_by_id(idea_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::IdeaNotFound { id: idea_id.to_string() })?;

        let was_approved = current.is_approved();
        let owner_id = current.user_id;

        let mut idea: IdeaActiveModel = current.into();
        idea.status = Set(String::from(status));
        idea.updated_at = Set(chrono::Utc::now().into());
        let updated = idea.update(&txn).await?;

        if status == IdeaStatus::Approved && !was_approved {
            insert_notification(
                &txn,
                Some(owner_id),
                "Project Approved".to_string(),
                "Congratulations! Your project has been approved by the admin.".to_string(),
                NotificationType::Announcement,
                Priority::Low,
            )
            .await?;
        }

        txn.commit().await?;
        Ok(updated)
    }

    /// Set or clear an idea's featured flag
    ///
    /// Independent of status: a pending idea may be featured. Featuring
    /// notifies the owner inside the same transaction.
    pub async fn set_idea_featured(&self, idea_id: Uuid, featured: bool) -> Result<Idea> {
        let txn = self.write_conn().begin().await?;

        let current = IdeaEntity::find_by_id(idea_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::IdeaNotFound { id: idea_id.to_string() })?;

        let was_featured = current.is_featured;
        let owner_id = current.user_id;

        let mut idea: IdeaActiveModel = current.into();
        idea.is_featured = Set(featured);
        idea.updated_at = Set(chrono::Utc::now().into());
        let updated = idea.update(&txn).await?;

        if featured && !was_featured {
            insert_notification(
                &txn,
                Some(owner_id),
                "Project Featured".to_string(),
                "Congratulations! Your project has been featured by the admin!".to_string(),
                NotificationType::Announcement,
                Priority::Low,
            )
            .await?;
        }

        txn.commit().await?;
        Ok(updated)
    }

    // ========================================================================
    // Suggestion Operations
    // ========================================================================

    /// Add a suggestion to an idea
    ///
    /// Idea owners may not author suggestions on their own idea.
    pub async fn create_suggestion(
        &self,
        idea_id: Uuid,
        user_id: Uuid,
        content: String,
    ) -> Result<Suggestion> {
        let idea = self
            .find_idea_by_id(idea_id)
            .await?
            .ok_or_else(|| AppError::IdeaNotFound { id: idea_id.to_string() })?;

        if idea.user_id == user_id {
            return Err(AppError::Forbidden {
                message: "Project owners cannot submit suggestions on their own project"
                    .to_string(),
            });
        }

        let now = chrono::Utc::now();
        let suggestion = SuggestionActiveModel {
            id: Set(Uuid::new_v4()),
            idea_id: Set(idea_id),
            user_id: Set(user_id),
            content: Set(content),
            created_at: Set(now.into()),
        };

        suggestion.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Load an idea's suggestion thread, most recent first
    ///
    /// Resolves author names, upvote counts, and upvoter names with
    /// follow-up queries rather than joins.
    pub async fn list_suggestion_thread(
        &self,
        idea_id: Uuid,
        caller: Option<Uuid>,
    ) -> Result<Vec<SuggestionThreadEntry>> {
        let suggestions = SuggestionEntity::find()
            .filter(SuggestionColumn::IdeaId.eq(idea_id))
            .order_by_desc(SuggestionColumn::CreatedAt)
            .order_by_desc(SuggestionColumn::Id)
            .all(self.read_conn())
            .await?;

        if suggestions.is_empty() {
            return Ok(Vec::new());
        }

        let suggestion_ids: Vec<Uuid> = suggestions.iter().map(|s| s.id).collect();

        let upvote_rows = SuggestionUpvoteEntity::find()
            .filter(SuggestionUpvoteColumn::SuggestionId.is_in(suggestion_ids))
            .all(self.read_conn())
            .await?;

        let mut involved: HashSet<Uuid> = suggestions.iter().map(|s| s.user_id).collect();
        involved.extend(upvote_rows.iter().map(|u| u.user_id));

        let profiles = ProfileEntity::find()
            .filter(ProfileColumn::Id.is_in(involved.into_iter().collect::<Vec<_>>()))
            .all(self.read_conn())
            .await?;

        let name_of: HashMap<Uuid, String> = profiles
            .into_iter()
            .map(|p| (p.id, p.full_name))
            .collect();

        let mut counts: HashMap<Uuid, u64> = HashMap::new();
        let mut voters: HashMap<Uuid, Vec<String>> = HashMap::new();
        let mut caller_voted: HashSet<Uuid> = HashSet::new();

        for row in &upvote_rows {
            *counts.entry(row.suggestion_id).or_insert(0) += 1;
            voters.entry(row.suggestion_id).or_default().push(
                name_of
                    .get(&row.user_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
            );
            if caller == Some(row.user_id) {
                caller_voted.insert(row.suggestion_id);
            }
        }

        Ok(suggestions
            .into_iter()
            .map(|suggestion| {
                let id = suggestion.id;
                SuggestionThreadEntry {
                    author_name: name_of
                        .get(&suggestion.user_id)
                        .cloned()
                        .unwrap_or_else(|| "Unknown".to_string()),
                    upvotes: counts.get(&id).copied().unwrap_or(0),
                    upvoter_names: voters.remove(&id).unwrap_or_default(),
                    upvoted_by_caller: caller_voted.contains(&id),
                    suggestion,
                }
            })
            .collect())
    }

    /// Toggle a user's upvote on a suggestion
    ///
    /// True toggle: inserts the row if absent, deletes it if present, and
    /// returns the post-state with the fresh count.
    pub async fn toggle_suggestion_upvote(
        &self,
        suggestion_id: Uuid,
        user_id: Uuid,
    ) -> Result<ToggleOutcome> {
        let txn = self.write_conn().begin().await?;

        SuggestionEntity::find_by_id(suggestion_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::SuggestionNotFound {
                id: suggestion_id.to_string(),
            })?;

        let existing = SuggestionUpvoteEntity::find()
            .filter(SuggestionUpvoteColumn::SuggestionId.eq(suggestion_id))
            .filter(SuggestionUpvoteColumn::UserId.eq(user_id))
            .one(&txn)
            .await?;

        let upvoted = match existing {
            Some(row) => {
                SuggestionUpvoteEntity::delete_by_id(row.id).exec(&txn).await?;
                false
            }
            None => {
                let now = chrono::Utc::now();
                let upvote = SuggestionUpvoteActiveModel {
                    id: Set(Uuid::new_v4()),
                    suggestion_id: Set(suggestion_id),
                    user_id: Set(user_id),
                    created_at: Set(now.into()),
                };
                upvote.insert(&txn).await?;
                true
            }
        };

        let count = SuggestionUpvoteEntity::find()
            .filter(SuggestionUpvoteColumn::SuggestionId.eq(suggestion_id))
            .count(&txn)
            .await?;

        txn.commit().await?;

        Ok(ToggleOutcome { upvoted, count })
    }

    // ========================================================================
    // Connection Operations
    // ========================================================================

    /// Create a follow edge (idempotent)
    ///
    /// Returns whether a new edge was created plus the authoritative
    /// follower count of the followed profile.
    pub async fn connect(&self, follower_id: Uuid, following_id: Uuid) -> Result<(bool, u64)> {
        if follower_id == following_id {
            return Err(AppError::Validation {
                message: "Cannot follow yourself".to_string(),
                field: None,
            });
        }

        ProfileEntity::find_by_id(following_id)
            .one(self.read_conn())
            .await?
            .ok_or_else(|| AppError::ProfileNotFound {
                id: following_id.to_string(),
            })?;

        let existing = ConnectionEntity::find()
            .filter(ConnectionColumn::FollowerId.eq(follower_id))
            .filter(ConnectionColumn::FollowingId.eq(following_id))
            .one(self.read_conn())
            .await?;

        let created = if existing.is_none() {
            let now = chrono::Utc::now();
            let edge = ConnectionActiveModel {
                id: Set(Uuid::new_v4()),
                follower_id: Set(follower_id),
                following_id: Set(following_id),
                created_at: Set(now.into()),
            };
            edge.insert(self.write_conn()).await?;
            true
        } else {
            false
        };

        let followers = self.count_followers(following_id).await?;
        Ok((created, followers))
    }

    /// Remove a follow edge
    ///
    /// A missing edge reports ConnectionNotFound without touching counts.
    pub async fn disconnect(&self, follower_id: Uuid, following_id: Uuid) -> Result<u64> {
        let edge = ConnectionEntity::find()
            .filter(ConnectionColumn::FollowerId.eq(follower_id))
            .filter(ConnectionColumn::FollowingId.eq(following_id))
            .one(self.write_conn())
            .await?
            .ok_or(AppError::ConnectionNotFound)?;

        ConnectionEntity::delete_by_id(edge.id)
            .exec(self.write_conn())
            .await?;

        self.count_followers(following_id).await
    }

    /// Count followers of a profile
    pub async fn count_followers(&self, user_id: Uuid) -> Result<u64> {
        ConnectionEntity::find()
            .filter(ConnectionColumn::FollowingId.eq(user_id))
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List every follow edge (directory aggregation)
    pub async fn list_connections(&self) -> Result<Vec<Connection>> {
        ConnectionEntity::find()
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Notification Operations
    // ========================================================================

    /// Create a notification; None addressee means broadcast to all users
    pub async fn create_notification(
        &self,
        user_id: Option<Uuid>,
        title: String,
        description: String,
        kind: NotificationType,
        priority: Priority,
    ) -> Result<Notification> {
        insert_notification(self.write_conn(), user_id, title, description, kind, priority).await
    }

    /// List notifications visible to a user (addressed or broadcast), newest
    /// first
    pub async fn list_notifications_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        NotificationEntity::find()
            .filter(
                Condition::any()
                    .add(NotificationColumn::UserId.eq(user_id))
                    .add(NotificationColumn::UserId.is_null()),
            )
            .order_by_desc(NotificationColumn::CreatedAt)
            .order_by_desc(NotificationColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List every notification, newest first (admin log)
    pub async fn list_all_notifications(&self) -> Result<Vec<Notification>> {
        NotificationEntity::find()
            .order_by_desc(NotificationColumn::CreatedAt)
            .order_by_desc(NotificationColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find notification by ID
    pub async fn find_notification_by_id(&self, id: Uuid) -> Result<Option<Notification>> {
        NotificationEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Delete a notification
    pub async fn delete_notification(&self, id: Uuid) -> Result<()> {
        let result = NotificationEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotificationNotFound { id: id.to_string() });
        }
        Ok(())
    }

    /// Most recent notifications of the feed-visible types
    pub async fn list_recent_feed_notifications(&self, limit: u64) -> Result<Vec<Notification>> {
        NotificationEntity::find()
            .filter(NotificationColumn::Kind.is_in(FEED_NOTIFICATION_TYPES.iter().copied()))
            .order_by_desc(NotificationColumn::CreatedAt)
            .order_by_desc(NotificationColumn::Id)
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // News Operations
    // ========================================================================

    /// Create a news item
    pub async fn create_news(&self, title: String, content: String) -> Result<News> {
        let now = chrono::Utc::now();

        let news = NewsActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            content: Set(content),
            created_at: Set(now.into()),
        };

        news.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Update a news item
    pub async fn update_news(&self, id: Uuid, title: String, content: String) -> Result<News> {
        let mut news: NewsActiveModel = NewsEntity::find_by_id(id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::NewsNotFound { id: id.to_string() })?
            .into();

        news.title = Set(title);
        news.content = Set(content);

        news.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete a news item
    pub async fn delete_news(&self, id: Uuid) -> Result<()> {
        let result = NewsEntity::delete_by_id(id).exec(self.write_conn()).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NewsNotFound { id: id.to_string() });
        }
        Ok(())
    }

    /// Find news by ID
    pub async fn find_news_by_id(&self, id: Uuid) -> Result<Option<News>> {
        NewsEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List news, newest first
    pub async fn list_news(&self) -> Result<Vec<News>> {
        NewsEntity::find()
            .order_by_desc(NewsColumn::CreatedAt)
            .order_by_desc(NewsColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Most recent news items
    pub async fn list_recent_news(&self, limit: u64) -> Result<Vec<News>> {
        NewsEntity::find()
            .order_by_desc(NewsColumn::CreatedAt)
            .order_by_desc(NewsColumn::Id)
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Achievement Operations
    // ========================================================================

    /// List achievements awarded to a user, most recent first
    pub async fn list_achievements_for_user(&self, user_id: Uuid) -> Result<Vec<Achievement>> {
        AchievementEntity::find()
            .filter(AchievementColumn::UserId.eq(user_id))
            .order_by_desc(AchievementColumn::AwardedAt)
            .order_by_desc(AchievementColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Help Query Operations
    // ========================================================================

    /// Create a help query with status=open
    pub async fn create_query(
        &self,
        user_id: Uuid,
        subject: String,
        message: String,
    ) -> Result<HelpQuery> {
        let now = chrono::Utc::now();

        let query = HelpQueryActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            subject: Set(subject),
            message: Set(message),
            status: Set(String::from(QueryStatus::Open)),
            admin_response: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        query.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// List a user's own help queries, newest first
    pub async fn list_queries_for_user(&self, user_id: Uuid) -> Result<Vec<HelpQuery>> {
        HelpQueryEntity::find()
            .filter(HelpQueryColumn::UserId.eq(user_id))
            .order_by_desc(HelpQueryColumn::CreatedAt)
            .order_by_desc(HelpQueryColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List every help query, newest first (admin)
    pub async fn list_all_queries(&self) -> Result<Vec<HelpQuery>> {
        HelpQueryEntity::find()
            .order_by_desc(HelpQueryColumn::CreatedAt)
            .order_by_desc(HelpQueryColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Record an admin response and resolve the query
    pub async fn respond_to_query(&self, id: Uuid, response: String) -> Result<HelpQuery> {
        let mut query: HelpQueryActiveModel = HelpQueryEntity::find_by_id(id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::QueryNotFound { id: id.to_string() })?
            .into();

        query.admin_response = Set(Some(response));
        query.status = Set(String::from(QueryStatus::Resolved));
        query.updated_at = Set(chrono::Utc::now().into());

        query.update(self.write_conn()).await.map_err(Into::into)
    }

    // ========================================================================
    // Password Reset Operations
    // ========================================================================

    /// Store a password reset token digest, replacing any pending one
    pub async fn create_password_reset(
        &self,
        user_id: Uuid,
        token_hash: String,
        ttl_minutes: i64,
    ) -> Result<PasswordReset> {
        PasswordResetEntity::delete_many()
            .filter(PasswordResetColumn::UserId.eq(user_id))
            .exec(self.write_conn())
            .await?;

        let now = chrono::Utc::now();
        let expires = now + chrono::Duration::minutes(ttl_minutes);

        let reset = PasswordResetActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            token_hash: Set(token_hash),
            expires_at: Set(expires.into()),
            created_at: Set(now.into()),
        };

        reset.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find a pending reset by token digest
    pub async fn find_password_reset(&self, token_hash: &str) -> Result<Option<PasswordReset>> {
        PasswordResetEntity::find()
            .filter(PasswordResetColumn::TokenHash.eq(token_hash))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Consume (delete) a reset token after use
    pub async fn consume_password_reset(&self, id: Uuid) -> Result<()> {
        PasswordResetEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;
        Ok(())
    }

    // ========================================================================
    // Dashboard Operations
    // ========================================================================

    /// Entity counts for the admin dashboard
    pub async fn dashboard_counts(&self) -> Result<DashboardCounts> {
        let users = ProfileEntity::find().count(self.read_conn()).await?;
        let ideas = IdeaEntity::find().count(self.read_conn()).await?;
        let notifications = NotificationEntity::find().count(self.read_conn()).await?;
        let news = NewsEntity::find().count(self.read_conn()).await?;

        Ok(DashboardCounts {
            users,
            ideas,
            notifications,
            news,
        })
    }

    /// Most recently registered profiles
    pub async fn list_recent_profiles(&self, limit: u64) -> Result<Vec<Profile>> {
        ProfileEntity::find()
            .order_by_desc(ProfileColumn::CreatedAt)
            .order_by_desc(ProfileColumn::Id)
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Most recent notifications (admin dashboard)
    pub async fn list_recent_notifications(&self, limit: u64) -> Result<Vec<Notification>> {
        NotificationEntity::find()
            .order_by_desc(NotificationColumn::CreatedAt)
            .order_by_desc(NotificationColumn::Id)
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }
}

/// Insert a notification row on any connection (plain or transactional)
async fn insert_notification<C: ConnectionTrait>(
    conn: &C,
    user_id: Option<Uuid>,
    title: String,
    description: String,
    kind: NotificationType,
    priority: Priority,
) -> Result<Notification> {
    let now = chrono::Utc::now();

    let notification = NotificationActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        title: Set(title),
        description: Set(description),
        kind: Set(String::from(kind)),
        priority: Set(String::from(priority)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    notification.insert(conn).await.map_err(Into::into)
}

/// Delete every row depending on an idea: suggestion upvotes, suggestions,
/// and upvote rows
async fn delete_idea_dependents(txn: &DatabaseTransaction, idea_id: Uuid) -> Result<()> {
    let suggestion_ids: Vec<Uuid> = SuggestionEntity::find()
        .filter(SuggestionColumn::IdeaId.eq(idea_id))
        .all(txn)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();

    if !suggestion_ids.is_empty() {
        SuggestionUpvoteEntity::delete_many()
            .filter(SuggestionUpvoteColumn::SuggestionId.is_in(suggestion_ids))
            .exec(txn)
            .await?;
    }

    SuggestionEntity::delete_many()
        .filter(SuggestionColumn::IdeaId.eq(idea_id))
        .exec(txn)
        .await?;

    UpvoteEntity::delete_many()
        .filter(UpvoteColumn::IdeaId.eq(idea_id))
        .exec(txn)
        .await?;

    Ok(())
}

/// Decrement an idea's upvote counter, floored at zero
async fn decrement_idea_upvotes(txn: &DatabaseTransaction, idea_id: Uuid) -> Result<()> {
    let stmt = Statement::from_sql_and_values(
        DbBackend::Postgres,
        "UPDATE ideas SET upvotes = GREATEST(upvotes - 1, 0), updated_at = NOW() WHERE id = $1",
        vec![idea_id.into()],
    );
    txn.execute(stmt).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_idea(title: &str, description: &str, category: &str, skills: &[&str]) -> Idea {
        let now = chrono::Utc::now();
        Idea {
            id: Uuid::from_u128(1),
            user_id: Uuid::from_u128(2),
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            links: Vec::new(),
            status: "pending".to_string(),
            is_featured: false,
            upvotes: 0,
            views: 0,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn test_filter_default_matches_everything() {
        let idea = make_idea("Solar tracker", "Dual-axis tracking rig", "Environment", &["IoT"]);
        assert!(IdeaFilter::default().matches(&idea));
    }

    #[test]
    fn test_filter_search_across_fields() {
        let idea = make_idea(
            "Solar tracker",
            "Dual-axis tracking rig",
            "Environment",
            &["Embedded C", "IoT"],
        );

        let by_title = IdeaFilter {
            search: Some("solar".to_string()),
            ..Default::default()
        };
        assert!(by_title.matches(&idea));

        let by_description = IdeaFilter {
            search: Some("DUAL-AXIS".to_string()),
            ..Default::default()
        };
        assert!(by_description.matches(&idea));

        let by_skill = IdeaFilter {
            search: Some("embedded".to_string()),
            ..Default::default()
        };
        assert!(by_skill.matches(&idea));

        let miss = IdeaFilter {
            search: Some("quantum".to_string()),
            ..Default::default()
        };
        assert!(!miss.matches(&idea));
    }

    #[test]
    fn test_filter_category_or_skill_membership() {
        let idea = make_idea("Mesh relay", "Campus mesh network", "Technology", &["Networking"]);

        let by_category = IdeaFilter {
            category: Some("Technology".to_string()),
            ..Default::default()
        };
        assert!(by_category.matches(&idea));

        let by_skill = IdeaFilter {
            category: Some("Networking".to_string()),
            ..Default::default()
        };
        assert!(by_skill.matches(&idea));

        let all = IdeaFilter {
            category: Some("all".to_string()),
            ..Default::default()
        };
        assert!(all.matches(&idea));

        let miss = IdeaFilter {
            category: Some("Healthcare".to_string()),
            ..Default::default()
        };
        assert!(!miss.matches(&idea));
    }

    #[test]
    fn test_filter_flags() {
        let mut idea = make_idea("Mesh relay", "Campus mesh network", "Technology", &[]);

        let featured = IdeaFilter {
            featured_only: true,
            ..Default::default()
        };
        assert!(!featured.matches(&idea));
        idea.is_featured = true;
        assert!(featured.matches(&idea));

        let approved = IdeaFilter {
            approved_only: true,
            ..Default::default()
        };
        assert!(!approved.matches(&idea));
        idea.status = "approved".to_string();
        assert!(approved.matches(&idea));
    }
}
