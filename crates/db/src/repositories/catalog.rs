//! Catalog repository for master data: users, cost centers, projects,
//! engineers and concepts.

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set, SqlErr,
};
use serde::Deserialize;
use uuid::Uuid;
use ziklo_shared::AppError;

use crate::entities::{concepts, cost_centers, engineers, projects, users};

/// Status assigned to catalog records created without one.
pub const DEFAULT_STATUS: &str = "active";

/// Error types for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A required text field was missing or blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A unique field already holds this value.
    #[error("{entity} with {field} '{value}' already exists")]
    Duplicate {
        /// Entity kind.
        entity: &'static str,
        /// Unique field name.
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::MissingField(_) => Self::Validation(err.to_string()),
            CatalogError::Duplicate { .. } => Self::Conflict(err.to_string()),
            CatalogError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Unique email.
    pub email: String,
    /// Status, defaults to `active`.
    pub status: Option<String>,
}

/// Input for creating a cost center.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCostCenter {
    /// Unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Status, defaults to `active`.
    pub status: Option<String>,
}

/// Input for creating a project.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    /// Unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Client the project is billed to.
    pub client: String,
    /// Status, defaults to `active`.
    pub status: Option<String>,
    /// Project leader.
    pub leader_user_id: Option<Uuid>,
    /// Owning cost center.
    pub cost_center_id: Option<Uuid>,
}

/// Input for creating an engineer.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEngineer {
    /// Linked user account.
    pub user_id: Option<Uuid>,
    /// Unique identity document number.
    pub document_number: String,
    /// Job title.
    pub title: String,
    /// Status, defaults to `active`.
    pub status: Option<String>,
}

/// Input for creating a concept.
#[derive(Debug, Clone, Deserialize)]
pub struct NewConcept {
    /// Unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Status, defaults to `active`.
    pub status: Option<String>,
}

/// Catalog repository.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    db: DatabaseConnection,
}

impl CatalogRepository {
    /// Creates a new catalog repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is blank, the email is taken, or the insert fails.
    pub async fn create_user(&self, input: NewUser) -> Result<users::Model, CatalogError> {
        let name = required("name", &input.name)?;
        let email = required("email", &input.email)?;
        let model = users::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name),
            email: Set(email.clone()),
            status: Set(status_or_default(input.status)),
            created_at: Set(chrono::Utc::now().into()),
        };
        model
            .insert(&self.db)
            .await
            .map_err(|e| duplicate(e, "user", "email", email))
    }

    /// Lists users by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_users(&self) -> Result<Vec<users::Model>, CatalogError> {
        Ok(users::Entity::find()
            .order_by_asc(users::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Creates a cost center.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is blank, the code is taken, or the insert fails.
    pub async fn create_cost_center(
        &self,
        input: NewCostCenter,
    ) -> Result<cost_centers::Model, CatalogError> {
        let code = required("code", &input.code)?;
        let name = required("name", &input.name)?;
        let model = cost_centers::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(code.clone()),
            name: Set(name),
            status: Set(status_or_default(input.status)),
            created_at: Set(chrono::Utc::now().into()),
        };
        model
            .insert(&self.db)
            .await
            .map_err(|e| duplicate(e, "cost center", "code", code))
    }

    /// Lists cost centers by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_cost_centers(&self) -> Result<Vec<cost_centers::Model>, CatalogError> {
        Ok(cost_centers::Entity::find()
            .order_by_asc(cost_centers::Column::Code)
            .all(&self.db)
            .await?)
    }

    /// Creates a project.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is blank, the code is taken, or the insert fails.
    pub async fn create_project(
        &self,
        input: NewProject,
    ) -> Result<projects::Model, CatalogError> {
        let code = required("code", &input.code)?;
        let name = required("name", &input.name)?;
        let client = required("client", &input.client)?;
        let model = projects::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(code.clone()),
            name: Set(name),
            client: Set(client),
            status: Set(status_or_default(input.status)),
            leader_user_id: Set(input.leader_user_id),
            cost_center_id: Set(input.cost_center_id),
            created_at: Set(chrono::Utc::now().into()),
        };
        model
            .insert(&self.db)
            .await
            .map_err(|e| duplicate(e, "project", "code", code))
    }

    /// Lists projects by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_projects(&self) -> Result<Vec<projects::Model>, CatalogError> {
        Ok(projects::Entity::find()
            .order_by_asc(projects::Column::Code)
            .all(&self.db)
            .await?)
    }

    /// Creates an engineer.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is blank, the document number is taken,
    /// or the insert fails.
    pub async fn create_engineer(
        &self,
        input: NewEngineer,
    ) -> Result<engineers::Model, CatalogError> {
        let document_number = required("document_number", &input.document_number)?;
        let title = required("title", &input.title)?;
        let model = engineers::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(input.user_id),
            document_number: Set(document_number.clone()),
            title: Set(title),
            status: Set(status_or_default(input.status)),
            created_at: Set(chrono::Utc::now().into()),
        };
        model
            .insert(&self.db)
            .await
            .map_err(|e| duplicate(e, "engineer", "document_number", document_number))
    }

    /// Lists engineers by document number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_engineers(&self) -> Result<Vec<engineers::Model>, CatalogError> {
        Ok(engineers::Entity::find()
            .order_by_asc(engineers::Column::DocumentNumber)
            .all(&self.db)
            .await?)
    }

    /// Creates a concept.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is blank, the code is taken, or the insert fails.
    pub async fn create_concept(&self, input: NewConcept) -> Result<concepts::Model, CatalogError> {
        let code = required("code", &input.code)?;
        let name = required("name", &input.name)?;
        let model = concepts::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(code.clone()),
            name: Set(name),
            status: Set(status_or_default(input.status)),
            created_at: Set(chrono::Utc::now().into()),
        };
        model
            .insert(&self.db)
            .await
            .map_err(|e| duplicate(e, "concept", "code", code))
    }

    /// Lists concepts by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_concepts(&self) -> Result<Vec<concepts::Model>, CatalogError> {
        Ok(concepts::Entity::find()
            .order_by_asc(concepts::Column::Code)
            .all(&self.db)
            .await?)
    }
}

fn required(field: &'static str, value: &str) -> Result<String, CatalogError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn status_or_default(status: Option<String>) -> String {
    status
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_STATUS.to_string())
}

fn duplicate(err: DbErr, entity: &'static str, field: &'static str, value: String) -> CatalogError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => CatalogError::Duplicate {
            entity,
            field,
            value,
        },
        _ => CatalogError::Database(err),
    }
}
