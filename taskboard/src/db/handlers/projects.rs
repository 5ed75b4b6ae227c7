//! Database repository for projects.

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::projects::{ProjectCreateDBRequest, ProjectDBResponse, ProjectLookupDB, ProjectUpdateDBRequest},
    },
    types::{ProjectId, UserId},
};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing projects
#[derive(Debug, Clone)]
pub struct ProjectFilter {
    pub owner_id: Option<UserId>,
    pub skip: i64,
    pub limit: i64,
}

impl Default for ProjectFilter {
    fn default() -> Self {
        Self {
            owner_id: None,
            skip: 0,
            limit: 100,
        }
    }
}

pub struct Projects<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Projects<'c> {
    type CreateRequest = ProjectCreateDBRequest;
    type UpdateRequest = ProjectUpdateDBRequest;
    type Response = ProjectDBResponse;
    type Id = ProjectId;
    type Filter = ProjectFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest, actor: Option<UserId>) -> Result<Self::Response> {
        let project = sqlx::query_as::<_, ProjectDBResponse>(
            r#"
            INSERT INTO projects (name, description, owner_id, start_date, end_date, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.owner_id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(actor)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(project)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let project = sqlx::query_as::<_, ProjectDBResponse>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(project)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = sqlx::QueryBuilder::new("SELECT * FROM projects");
        if let Some(owner_id) = filter.owner_id {
            query.push(" WHERE owner_id = ");
            query.push_bind(owner_id);
        }
        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let projects = query.build_query_as::<ProjectDBResponse>().fetch_all(&mut *self.db).await?;

        Ok(projects)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest, actor: Option<UserId>) -> Result<Self::Response> {
        let project = sqlx::query_as::<_, ProjectDBResponse>(
            r#"
            UPDATE projects SET
                name = $2,
                description = $3,
                owner_id = $4,
                start_date = $5,
                end_date = $6,
                updated_at = NOW(),
                updated_by = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.owner_id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(actor)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(project)
    }
}

impl<'c> Projects<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// `(id, name)` pairs for every project, ordered by name. Feeds the
    /// lookup cache.
    #[instrument(skip(self), err)]
    pub async fn lookup(&mut self) -> Result<Vec<ProjectLookupDB>> {
        let pairs = sqlx::query_as::<_, ProjectLookupDB>("SELECT id, name FROM projects ORDER BY name")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::Users;
    use crate::db::models::users::UserCreateDBRequest;
    use sqlx::PgPool;

    async fn create_owner(conn: &mut PgConnection, username: &str) -> UserId {
        let mut users = Users::new(conn);
        users
            .create(
                &UserCreateDBRequest {
                    username: username.to_string(),
                    email: format!("{username}@example.com"),
                    full_name: username.to_string(),
                    password_hash: "$argon2id$fake$hash".to_string(),
                },
                None,
            )
            .await
            .unwrap()
            .id
    }

    fn create_request(name: &str, owner_id: UserId) -> ProjectCreateDBRequest {
        ProjectCreateDBRequest {
            name: name.to_string(),
            description: "A test project".to_string(),
            owner_id,
            start_date: None,
            end_date: None,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get_project(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let owner = create_owner(&mut conn, "owner").await;
        let mut repo = Projects::new(&mut conn);

        let created = repo.create(&create_request("Alpha", owner), Some(owner)).await.unwrap();
        assert_eq!(created.name, "Alpha");
        assert_eq!(created.owner_id, owner);
        assert_eq!(created.created_by, Some(owner));

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);

        assert!(repo.get_by_id(created.id + 1000).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_with_unknown_owner_is_fk_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Projects::new(&mut conn);

        let err = repo.create(&create_request("Orphan", 9999), None).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters_by_owner(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let owner_a = create_owner(&mut conn, "owner-a").await;
        let owner_b = create_owner(&mut conn, "owner-b").await;
        let mut repo = Projects::new(&mut conn);

        repo.create(&create_request("A1", owner_a), None).await.unwrap();
        repo.create(&create_request("A2", owner_a), None).await.unwrap();
        repo.create(&create_request("B1", owner_b), None).await.unwrap();

        let all = repo.list(&ProjectFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let only_a = repo
            .list(&ProjectFilter {
                owner_id: Some(owner_a),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(only_a.len(), 2);
        assert!(only_a.iter().all(|p| p.owner_id == owner_a));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_lookup_returns_pairs_sorted_by_name(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let owner = create_owner(&mut conn, "owner").await;
        let mut repo = Projects::new(&mut conn);

        repo.create(&create_request("Zulu", owner), None).await.unwrap();
        repo.create(&create_request("Alpha", owner), None).await.unwrap();

        let pairs = repo.lookup().await.unwrap();
        let names: Vec<&str> = pairs.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zulu"]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_stamps_actor(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let owner = create_owner(&mut conn, "owner").await;
        let mut repo = Projects::new(&mut conn);

        let created = repo.create(&create_request("Before", owner), Some(owner)).await.unwrap();

        let updated = repo
            .update(
                created.id,
                &ProjectUpdateDBRequest {
                    name: "After".to_string(),
                    description: created.description.clone(),
                    owner_id: owner,
                    start_date: created.start_date,
                    end_date: created.end_date,
                },
                Some(owner),
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "After");
        assert_eq!(updated.updated_by, Some(owner));
        assert!(updated.updated_at.is_some());
    }
}
