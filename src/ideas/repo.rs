use sqlx::PgPool;
use uuid::Uuid;

use crate::ideas::repo_types::Idea;
use crate::users::repo_types::User;

pub async fn fetch_all(db: &PgPool) -> sqlx::Result<Vec<Idea>> {
    sqlx::query_as::<_, Idea>(
        r#"
        SELECT id, author_id, title, description, created_at, updated_at
        FROM ideas
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn fetch(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Idea>> {
    sqlx::query_as::<_, Idea>(
        r#"
        SELECT id, author_id, title, description, created_at, updated_at
        FROM ideas
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert(
    db: &PgPool,
    author_id: Uuid,
    title: &str,
    description: &str,
) -> sqlx::Result<Idea> {
    sqlx::query_as::<_, Idea>(
        r#"
        INSERT INTO ideas (author_id, title, description)
        VALUES ($1, $2, $3)
        RETURNING id, author_id, title, description, created_at, updated_at
        "#,
    )
    .bind(author_id)
    .bind(title)
    .bind(description)
    .fetch_one(db)
    .await
}

/// Partial update: absent fields keep their stored value.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    title: Option<&str>,
    description: Option<&str>,
) -> sqlx::Result<Idea> {
    sqlx::query_as::<_, Idea>(
        r#"
        UPDATE ideas
        SET title       = COALESCE($2, title),
            description = COALESCE($3, description),
            updated_at  = now()
        WHERE id = $1
        RETURNING id, author_id, title, description, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(description)
    .fetch_one(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM ideas WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn by_author(db: &PgPool, author_id: Uuid) -> sqlx::Result<Vec<Idea>> {
    sqlx::query_as::<_, Idea>(
        r#"
        SELECT id, author_id, title, description, created_at, updated_at
        FROM ideas
        WHERE author_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(author_id)
    .fetch_all(db)
    .await
}

async fn voters_from(db: &PgPool, table: &str, idea_id: Uuid) -> sqlx::Result<Vec<User>> {
    let sql = format!(
        r#"
        SELECT u.id, u.username, u.password_hash, u.created_at
        FROM {table} v
        JOIN users u ON u.id = v.user_id
        WHERE v.idea_id = $1
        ORDER BY u.created_at
        "#
    );
    sqlx::query_as::<_, User>(&sql).bind(idea_id).fetch_all(db).await
}

/// Both voter sets of an idea, users resolved.
pub async fn voters(db: &PgPool, idea_id: Uuid) -> sqlx::Result<(Vec<User>, Vec<User>)> {
    let upvoters = voters_from(db, "idea_upvotes", idea_id).await?;
    let downvoters = voters_from(db, "idea_downvotes", idea_id).await?;
    Ok((upvoters, downvoters))
}

/// Persist one user's vote membership on one idea: the user ends up in
/// the upvote table iff `upvoted`, in the downvote table iff `downvoted`.
pub async fn set_vote_membership(
    db: &PgPool,
    idea_id: Uuid,
    user_id: Uuid,
    upvoted: bool,
    downvoted: bool,
) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM idea_upvotes WHERE idea_id = $1 AND user_id = $2")
        .bind(idea_id)
        .bind(user_id)
        .execute(db)
        .await?;
    sqlx::query("DELETE FROM idea_downvotes WHERE idea_id = $1 AND user_id = $2")
        .bind(idea_id)
        .bind(user_id)
        .execute(db)
        .await?;
    if upvoted {
        sqlx::query("INSERT INTO idea_upvotes (idea_id, user_id) VALUES ($1, $2)")
            .bind(idea_id)
            .bind(user_id)
            .execute(db)
            .await?;
    }
    if downvoted {
        sqlx::query("INSERT INTO idea_downvotes (idea_id, user_id) VALUES ($1, $2)")
            .bind(idea_id)
            .bind(user_id)
            .execute(db)
            .await?;
    }
    Ok(())
}

pub async fn bookmarked_idea_ids(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<Uuid>> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT idea_id
        FROM bookmarks
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn bookmarked_ideas(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<Idea>> {
    sqlx::query_as::<_, Idea>(
        r#"
        SELECT i.id, i.author_id, i.title, i.description, i.created_at, i.updated_at
        FROM bookmarks b
        JOIN ideas i ON i.id = b.idea_id
        WHERE b.user_id = $1
        ORDER BY i.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn set_bookmark_membership(
    db: &PgPool,
    user_id: Uuid,
    idea_id: Uuid,
    bookmarked: bool,
) -> sqlx::Result<()> {
    if bookmarked {
        sqlx::query(
            "INSERT INTO bookmarks (user_id, idea_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(idea_id)
        .execute(db)
        .await?;
    } else {
        sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND idea_id = $2")
            .bind(user_id)
            .bind(idea_id)
            .execute(db)
            .await?;
    }
    Ok(())
}
