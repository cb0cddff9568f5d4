use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::ideas::dto::{CreateIdeaRequest, IdeaResponse, UpdateIdeaRequest};
use crate::ideas::repo;
use crate::ideas::repo_types::Idea;
use crate::users;
use crate::users::dto::{PublicUser, UserProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
}

/// Path segments arrive as raw strings; anything that is not a UUID is
/// rejected before the store is touched.
pub fn parse_idea_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::InvalidIdentifier)
}

/// Toggle one user's vote across an idea's voter sets.
///
/// A user found in the opposite set is removed from both sets, so a flip
/// collapses to "no vote" rather than moving the vote. A user in neither
/// set joins the requested set. A user already in the requested set only
/// is rejected.
///
/// Postcondition: the sets stay disjoint and the user appears at most once.
pub fn apply_vote(
    upvoters: &mut Vec<Uuid>,
    downvoters: &mut Vec<Uuid>,
    user_id: Uuid,
    vote: Vote,
) -> Result<(), ApiError> {
    let (requested, opposite) = match vote {
        Vote::Up => (upvoters, downvoters),
        Vote::Down => (downvoters, upvoters),
    };

    if opposite.contains(&user_id) {
        opposite.retain(|id| *id != user_id);
        requested.retain(|id| *id != user_id);
    } else if !requested.contains(&user_id) {
        requested.push(user_id);
    } else {
        return Err(ApiError::InvalidVote);
    }
    Ok(())
}

pub fn add_bookmark(bookmarks: &mut Vec<Uuid>, idea_id: Uuid) -> Result<(), ApiError> {
    if bookmarks.contains(&idea_id) {
        return Err(ApiError::AlreadyBookmarked);
    }
    bookmarks.push(idea_id);
    Ok(())
}

pub fn remove_bookmark(bookmarks: &mut Vec<Uuid>, idea_id: Uuid) -> Result<(), ApiError> {
    if !bookmarks.contains(&idea_id) {
        return Err(ApiError::NotBookmarked);
    }
    bookmarks.retain(|id| *id != idea_id);
    Ok(())
}

fn ensure_ownership(idea: &Idea, user_id: Uuid) -> Result<(), ApiError> {
    if idea.author_id != user_id {
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

/// Resolve author and voter relations for a response.
async fn to_response(db: &PgPool, idea: Idea) -> Result<IdeaResponse, ApiError> {
    let author = users::repo::find_by_id(db, idea.author_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let (upvoters, downvoters) = repo::voters(db, idea.id).await?;
    Ok(IdeaResponse {
        id: idea.id,
        title: idea.title,
        description: idea.description,
        created_at: idea.created_at,
        updated_at: idea.updated_at,
        author: PublicUser::from(&author),
        upvotes: upvoters.iter().map(PublicUser::from).collect(),
        downvotes: downvoters.iter().map(PublicUser::from).collect(),
    })
}

pub async fn list(db: &PgPool) -> Result<Vec<IdeaResponse>, ApiError> {
    let ideas = repo::fetch_all(db).await?;
    let mut responses = Vec::with_capacity(ideas.len());
    for idea in ideas {
        responses.push(to_response(db, idea).await?);
    }
    Ok(responses)
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    payload: CreateIdeaRequest,
) -> Result<IdeaResponse, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("Title must not be empty".into()));
    }
    let idea = repo::insert(db, user_id, payload.title.trim(), &payload.description).await?;
    info!(idea_id = %idea.id, author_id = %user_id, "idea created");
    to_response(db, idea).await
}

pub async fn read(db: &PgPool, id: &str) -> Result<IdeaResponse, ApiError> {
    let idea_id = parse_idea_id(id)?;
    let idea = repo::fetch(db, idea_id).await?.ok_or(ApiError::NotFound)?;
    to_response(db, idea).await
}

pub async fn update(
    db: &PgPool,
    id: &str,
    user_id: Uuid,
    payload: UpdateIdeaRequest,
) -> Result<IdeaResponse, ApiError> {
    let idea_id = parse_idea_id(id)?;

    // Re-fetch the freshest record before the ownership check.
    let idea = repo::fetch(db, idea_id).await?.ok_or(ApiError::NotFound)?;
    ensure_ownership(&idea, user_id)?;

    let updated = repo::update(
        db,
        idea_id,
        payload.title.as_deref(),
        payload.description.as_deref(),
    )
    .await?;
    info!(idea_id = %idea_id, author_id = %user_id, "idea updated");
    to_response(db, updated).await
}

pub async fn destroy(db: &PgPool, id: &str, user_id: Uuid) -> Result<IdeaResponse, ApiError> {
    let idea_id = parse_idea_id(id)?;

    let idea = repo::fetch(db, idea_id).await?.ok_or(ApiError::NotFound)?;
    ensure_ownership(&idea, user_id)?;

    let response = to_response(db, idea).await?;
    repo::delete(db, idea_id).await?;
    info!(idea_id = %idea_id, author_id = %user_id, "idea deleted");
    Ok(response)
}

pub async fn cast_vote(
    db: &PgPool,
    id: &str,
    user_id: Uuid,
    vote: Vote,
) -> Result<IdeaResponse, ApiError> {
    let idea_id = parse_idea_id(id)?;

    let idea = repo::fetch(db, idea_id).await?.ok_or(ApiError::NotFound)?;
    let (upvoters, downvoters) = repo::voters(db, idea_id).await?;
    let mut up: Vec<Uuid> = upvoters.iter().map(|u| u.id).collect();
    let mut down: Vec<Uuid> = downvoters.iter().map(|u| u.id).collect();

    apply_vote(&mut up, &mut down, user_id, vote)?;

    repo::set_vote_membership(
        db,
        idea_id,
        user_id,
        up.contains(&user_id),
        down.contains(&user_id),
    )
    .await?;
    info!(idea_id = %idea_id, voter_id = %user_id, vote = ?vote, "vote applied");
    to_response(db, idea).await
}

pub async fn bookmark(db: &PgPool, id: &str, user_id: Uuid) -> Result<UserProfile, ApiError> {
    let idea_id = parse_idea_id(id)?;

    let idea = repo::fetch(db, idea_id).await?.ok_or(ApiError::NotFound)?;
    let user = users::repo::find_by_id(db, user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let mut marks = repo::bookmarked_idea_ids(db, user_id).await?;
    add_bookmark(&mut marks, idea.id)?;
    repo::set_bookmark_membership(db, user_id, idea.id, true).await?;

    info!(idea_id = %idea.id, user_id = %user_id, "idea bookmarked");
    users::services::profile(db, user).await
}

pub async fn unbookmark(db: &PgPool, id: &str, user_id: Uuid) -> Result<UserProfile, ApiError> {
    let idea_id = parse_idea_id(id)?;

    let idea = repo::fetch(db, idea_id).await?.ok_or(ApiError::NotFound)?;
    let user = users::repo::find_by_id(db, user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let mut marks = repo::bookmarked_idea_ids(db, user_id).await?;
    remove_bookmark(&mut marks, idea.id)?;
    repo::set_bookmark_membership(db, user_id, idea.id, false).await?;

    info!(idea_id = %idea.id, user_id = %user_id, "idea unbookmarked");
    users::services::profile(db, user).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn upvote_from_neither_set_adds_once() {
        let user = Uuid::new_v4();
        let mut up = vec![];
        let mut down = vec![];

        apply_vote(&mut up, &mut down, user, Vote::Up).expect("vote applies");

        assert_eq!(up, vec![user]);
        assert!(down.is_empty());
    }

    #[test]
    fn upvote_while_downvoted_clears_both_sets() {
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut up = vec![other];
        let mut down = vec![user];

        apply_vote(&mut up, &mut down, user, Vote::Up).expect("vote applies");

        // Flip collapses to "no vote"; other voters untouched.
        assert_eq!(up, vec![other]);
        assert!(down.is_empty());
    }

    #[test]
    fn downvote_while_upvoted_clears_both_sets() {
        let user = Uuid::new_v4();
        let mut up = vec![user];
        let mut down = vec![];

        apply_vote(&mut up, &mut down, user, Vote::Down).expect("vote applies");

        assert!(up.is_empty());
        assert!(down.is_empty());
    }

    #[test]
    fn repeated_vote_in_same_direction_is_rejected() {
        let user = Uuid::new_v4();
        let mut up = vec![user];
        let mut down = vec![];

        let err = apply_vote(&mut up, &mut down, user, Vote::Up).unwrap_err();

        assert!(matches!(err, ApiError::InvalidVote));
        assert_eq!(up, vec![user]);
    }

    #[test]
    fn voter_sets_stay_disjoint_under_any_sequence() {
        let voters = ids(3);
        let mut up = vec![];
        let mut down = vec![];

        let sequence = [
            (voters[0], Vote::Up),
            (voters[1], Vote::Down),
            (voters[0], Vote::Down), // flip: clears both
            (voters[2], Vote::Up),
            (voters[1], Vote::Up), // flip: clears both
            (voters[0], Vote::Up),
        ];
        for (user, vote) in sequence {
            let _ = apply_vote(&mut up, &mut down, user, vote);
            for id in &up {
                assert!(!down.contains(id), "sets must stay disjoint");
            }
            assert!(
                up.iter().filter(|id| **id == user).count() <= 1,
                "user appears at most once"
            );
        }

        assert_eq!(up, vec![voters[2], voters[0]]);
        assert!(down.is_empty());
    }

    #[test]
    fn bookmark_twice_fails() {
        let idea = Uuid::new_v4();
        let mut marks = vec![];

        add_bookmark(&mut marks, idea).expect("first bookmark");
        let err = add_bookmark(&mut marks, idea).unwrap_err();

        assert!(matches!(err, ApiError::AlreadyBookmarked));
        assert_eq!(marks, vec![idea]);
    }

    #[test]
    fn remove_missing_bookmark_fails() {
        let mut marks = vec![Uuid::new_v4()];
        let err = remove_bookmark(&mut marks, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ApiError::NotBookmarked));
    }

    #[test]
    fn bookmark_roundtrip() {
        let idea = Uuid::new_v4();
        let mut marks = vec![];

        add_bookmark(&mut marks, idea).expect("add");
        remove_bookmark(&mut marks, idea).expect("remove");

        assert!(marks.is_empty());
    }

    #[test]
    fn malformed_id_is_rejected_before_any_store_access() {
        let err = parse_idea_id("abc").unwrap_err();
        assert!(matches!(err, ApiError::InvalidIdentifier));
    }

    #[test]
    fn well_formed_id_parses() {
        let id = Uuid::new_v4();
        assert_eq!(parse_idea_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn ownership_check_rejects_non_author() {
        let author = Uuid::new_v4();
        let idea = Idea {
            id: Uuid::new_v4(),
            author_id: author,
            title: "t".into(),
            description: "d".into(),
            created_at: time::OffsetDateTime::now_utc(),
            updated_at: time::OffsetDateTime::now_utc(),
        };

        assert!(ensure_ownership(&idea, author).is_ok());
        let err = ensure_ownership(&idea, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }
}
