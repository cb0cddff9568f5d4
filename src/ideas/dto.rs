use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::ideas::repo_types::Idea;
use crate::users::dto::PublicUser;

#[derive(Debug, Deserialize)]
pub struct CreateIdeaRequest {
    pub title: String,
    pub description: String,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateIdeaRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Idea with author and vote relations resolved.
#[derive(Debug, Serialize)]
pub struct IdeaResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub author: PublicUser,
    pub upvotes: Vec<PublicUser>,
    pub downvotes: Vec<PublicUser>,
}

/// Idea without relations, used inside user profiles.
#[derive(Debug, Serialize)]
pub struct IdeaSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<&Idea> for IdeaSummary {
    fn from(idea: &Idea) -> Self {
        Self {
            id: idea.id,
            title: idea.title.clone(),
            description: idea.description.clone(),
            created_at: idea.created_at,
            updated_at: idea.updated_at,
        }
    }
}
