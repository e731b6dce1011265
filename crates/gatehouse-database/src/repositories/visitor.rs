//! Visitor repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_entity::visitor::{CreateVisitor, Visitor};

/// Repository for visitor CRUD and gallery-handle lookup.
#[derive(Debug, Clone)]
pub struct VisitorRepository {
    pool: PgPool,
}

impl VisitorRepository {
    /// Create a new visitor repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a new visitor.
    pub async fn create(&self, data: &CreateVisitor) -> AppResult<Visitor> {
        sqlx::query_as::<_, Visitor>(
            "INSERT INTO visitors (name, email, face_template_id) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.face_template_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create visitor", e))
    }

    /// Find a visitor by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Visitor>> {
        sqlx::query_as::<_, Visitor>("SELECT * FROM visitors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find visitor", e))
    }

    /// Find a visitor by their email address.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Visitor>> {
        sqlx::query_as::<_, Visitor>("SELECT * FROM visitors WHERE email = $1 LIMIT 1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find visitor by email", e)
            })
    }

    /// Find a visitor by their biometric gallery handle.
    ///
    /// Arrival resolution path: the matcher returns a template handle and
    /// this lookup turns it into an identity.
    pub async fn find_by_face_template(&self, face_template_id: &str) -> AppResult<Option<Visitor>> {
        sqlx::query_as::<_, Visitor>("SELECT * FROM visitors WHERE face_template_id = $1")
            .bind(face_template_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    "Failed to find visitor by face template",
                    e,
                )
            })
    }

    /// Replace a visitor's gallery handle (re-registration).
    pub async fn replace_face_template(
        &self,
        visitor_id: Uuid,
        face_template_id: &str,
    ) -> AppResult<()> {
        let result = sqlx::query("UPDATE visitors SET face_template_id = $2 WHERE id = $1")
            .bind(visitor_id)
            .bind(face_template_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to replace face template", e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Visitor {visitor_id} not found"
            )));
        }
        Ok(())
    }

    /// Mark that a visitor completed the arrival kiosk flow.
    pub async fn mark_passed_registration(&self, visitor_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE visitors SET passed_registration = TRUE WHERE id = $1")
            .bind(visitor_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update visitor", e)
            })?;
        Ok(())
    }

    /// Count all registered visitors.
    pub async fn count_all(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visitors")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count visitors", e)
            })?;
        Ok(count)
    }
}
