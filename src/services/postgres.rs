use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;

use crate::models::{
    ApplicationRecord, ApplicationSummary, Credentials, InternshipPosting, NewUser, UserProfile,
};
use crate::services::store::{Store, StoreError};

const POSTING_COLUMNS: &str = "id, title, company, location, domain, description, required_skills";

/// PostgreSQL-backed store
///
/// Migrations in `./migrations` run on connect.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout_secs: u64,
        idle_timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(idle_timeout_secs))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from optional settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            acquire_timeout_secs.unwrap_or(5),
            idle_timeout_secs.unwrap_or(600),
        )
        .await
    }
}

fn posting_from_row(row: &PgRow) -> InternshipPosting {
    InternshipPosting {
        id: row.get("id"),
        title: row.get("title"),
        company: row.get("company"),
        location: row.get("location"),
        domain: row.get("domain"),
        description: row.get("description"),
        required_skills: row.get("required_skills"),
    }
}

fn profile_from_row(row: &PgRow) -> UserProfile {
    UserProfile {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        skills: row.get("skills"),
    }
}

#[async_trait]
impl Store for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn create_user(&self, user: NewUser) -> Result<UserProfile, StoreError> {
        let query = r#"
            INSERT INTO users (id, name, email, password_hash, skills)
            VALUES ($1, $2, $3, $4, $5)
        "#;

        let result = sqlx::query(query)
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.skills)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                tracing::debug!("Created user {}", user.id);
                Ok(user.profile())
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                StoreError::Conflict(format!("Email already registered: {}", user.email)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, StoreError> {
        let query = r#"
            SELECT id, name, email, password_hash
            FROM users
            WHERE LOWER(email) = LOWER($1)
        "#;

        let row = sqlx::query(query)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Credentials {
            user_id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
        }))
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        let query = "SELECT id, name, email, skills FROM users WHERE id = $1";

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(profile_from_row))
    }

    async fn update_skills(
        &self,
        user_id: &str,
        skills: &[String],
    ) -> Result<Option<UserProfile>, StoreError> {
        let query = r#"
            UPDATE users SET skills = $2
            WHERE id = $1
            RETURNING id, name, email, skills
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .bind(skills)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(profile_from_row))
    }

    async fn seed_postings(&self, postings: &[InternshipPosting]) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query("SELECT COUNT(*) AS count FROM internships")
            .fetch_one(&mut *tx)
            .await?
            .get("count");

        if existing > 0 {
            tracing::debug!("Catalog already holds {} postings, skipping seed", existing);
            return Ok(0);
        }

        let query = r#"
            INSERT INTO internships
                (id, position, title, company, location, domain, description, required_skills)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
        "#;

        let mut inserted = 0;
        for (position, posting) in postings.iter().enumerate() {
            let result = sqlx::query(query)
                .bind(&posting.id)
                .bind(position as i32)
                .bind(&posting.title)
                .bind(&posting.company)
                .bind(&posting.location)
                .bind(&posting.domain)
                .bind(&posting.description)
                .bind(&posting.required_skills)
                .execute(&mut *tx)
                .await?;
            inserted += result.rows_affected() as usize;
        }

        tx.commit().await?;

        Ok(inserted)
    }

    async fn list_postings(&self) -> Result<Vec<InternshipPosting>, StoreError> {
        let query = format!("SELECT {} FROM internships ORDER BY position", POSTING_COLUMNS);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(posting_from_row).collect())
    }

    async fn get_posting(
        &self,
        internship_id: &str,
    ) -> Result<Option<InternshipPosting>, StoreError> {
        let query = format!("SELECT {} FROM internships WHERE id = $1", POSTING_COLUMNS);

        let row = sqlx::query(&query)
            .bind(internship_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(posting_from_row))
    }

    /// Uses INSERT ... ON CONFLICT DO NOTHING so repeated adds are no-ops
    async fn add_to_wishlist(
        &self,
        user_id: &str,
        internship_id: &str,
    ) -> Result<bool, StoreError> {
        let query = r#"
            INSERT INTO wishlist (user_id, internship_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, internship_id) DO NOTHING
        "#;

        let result = sqlx::query(query)
            .bind(user_id)
            .bind(internship_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_from_wishlist(
        &self,
        user_id: &str,
        internship_id: &str,
    ) -> Result<bool, StoreError> {
        let query = r#"
            DELETE FROM wishlist
            WHERE user_id = $1 AND internship_id = $2
        "#;

        let result = sqlx::query(query)
            .bind(user_id)
            .bind(internship_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn wishlist_postings(&self, user_id: &str) -> Result<Vec<InternshipPosting>, StoreError> {
        let query = r#"
            SELECT i.id, i.title, i.company, i.location, i.domain, i.description, i.required_skills
            FROM wishlist w
            JOIN internships i ON w.internship_id = i.id
            WHERE w.user_id = $1
            ORDER BY i.position
        "#;

        let rows = sqlx::query(query).bind(user_id).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(posting_from_row).collect())
    }

    async fn wishlist_ids(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        let query = r#"
            SELECT w.internship_id
            FROM wishlist w
            LEFT JOIN internships i ON w.internship_id = i.id
            WHERE w.user_id = $1
            ORDER BY i.position ASC NULLS LAST, w.internship_id
        "#;

        let rows = sqlx::query(query).bind(user_id).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(|row| row.get("internship_id")).collect())
    }

    async fn create_application(
        &self,
        user_id: &str,
        internship_id: &str,
    ) -> Result<ApplicationRecord, StoreError> {
        let record = ApplicationRecord::new(user_id, internship_id);

        let query = r#"
            INSERT INTO applications (id, user_id, internship_id, application_date, status)
            VALUES ($1, $2, $3, $4, $5)
        "#;

        sqlx::query(query)
            .bind(&record.id)
            .bind(&record.user_id)
            .bind(&record.internship_id)
            .bind(record.application_date)
            .bind(&record.status)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Recorded application {} -> {}", user_id, internship_id);

        Ok(record)
    }

    async fn list_applications(
        &self,
        user_id: &str,
    ) -> Result<Vec<ApplicationSummary>, StoreError> {
        let query = r#"
            SELECT i.title, i.company, a.application_date, a.status
            FROM applications a
            JOIN internships i ON a.internship_id = i.id
            WHERE a.user_id = $1
            ORDER BY a.application_date DESC
        "#;

        let rows = sqlx::query(query).bind(user_id).fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(|row| ApplicationSummary {
                title: row.get("title"),
                company: row.get("company"),
                application_date: row.get("application_date"),
                status: row.get("status"),
            })
            .collect())
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
