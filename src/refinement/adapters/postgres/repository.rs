//! `PostgreSQL` repository implementation for refinement storage.

use super::{
    models::{NewRefinementRow, RefinementRow},
    schema::task_refinements,
};
use crate::identity::{EmailAddress, SubjectId};
use crate::refinement::{
    domain::{
        AuthorRole, PersistedRefinementData, Refinement, RefinementId, RefinementKind,
    },
    ports::{RefinementRepository, RefinementRepositoryError, RefinementRepositoryResult},
};
use crate::task::domain::TaskId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by refinement adapters.
pub type RefinementPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed refinement repository.
#[derive(Debug, Clone)]
pub struct PostgresRefinementRepository {
    pool: RefinementPgPool,
}

impl PostgresRefinementRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: RefinementPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> RefinementRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RefinementRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(RefinementRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(RefinementRepositoryError::persistence)?
    }
}

#[async_trait]
impl RefinementRepository for PostgresRefinementRepository {
    async fn insert(&self, refinement: &Refinement) -> RefinementRepositoryResult<()> {
        let refinement_id = refinement.id();
        let row = refinement_to_row(refinement);
        self.run_blocking(move |connection| {
            diesel::insert_into(task_refinements::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        RefinementRepositoryError::DuplicateRefinement(refinement_id)
                    }
                    _ => RefinementRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find(&self, id: RefinementId) -> RefinementRepositoryResult<Option<Refinement>> {
        self.run_blocking(move |connection| {
            let row = task_refinements::table
                .find(id.into_inner())
                .select(RefinementRow::as_select())
                .first::<RefinementRow>(connection)
                .optional()
                .map_err(RefinementRepositoryError::persistence)?;
            row.map(row_to_refinement).transpose()
        })
        .await
    }

    async fn list_for_task(
        &self,
        task_id: TaskId,
    ) -> RefinementRepositoryResult<Vec<Refinement>> {
        self.run_blocking(move |connection| {
            let rows = task_refinements::table
                .filter(task_refinements::task_id.eq(task_id.into_inner()))
                .order(task_refinements::created_at.asc())
                .select(RefinementRow::as_select())
                .load::<RefinementRow>(connection)
                .map_err(RefinementRepositoryError::persistence)?;
            rows.into_iter().map(row_to_refinement).collect()
        })
        .await
    }
}

fn refinement_to_row(refinement: &Refinement) -> NewRefinementRow {
    NewRefinementRow {
        id: refinement.id().into_inner(),
        task_id: refinement.task_id().into_inner(),
        author_subject: refinement.author().as_str().to_owned(),
        author_email: refinement.author_email().as_str().to_owned(),
        author_name: refinement.author_name().map(str::to_owned),
        role: refinement.role().as_str().to_owned(),
        kind: refinement.kind().as_str().to_owned(),
        content: refinement.content().to_owned(),
        parent_id: refinement.parent_id().map(RefinementId::into_inner),
        created_at: refinement.created_at(),
        updated_at: refinement.updated_at(),
    }
}

fn row_to_refinement(row: RefinementRow) -> RefinementRepositoryResult<Refinement> {
    let author =
        SubjectId::new(row.author_subject).map_err(RefinementRepositoryError::persistence)?;
    let author_email =
        EmailAddress::parse(row.author_email).map_err(RefinementRepositoryError::persistence)?;
    let role =
        AuthorRole::try_from(row.role.as_str()).map_err(RefinementRepositoryError::persistence)?;
    let kind = RefinementKind::try_from(row.kind.as_str())
        .map_err(RefinementRepositoryError::persistence)?;

    Ok(Refinement::from_persisted(PersistedRefinementData {
        id: RefinementId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        author,
        author_email,
        author_name: row.author_name,
        role,
        kind,
        content: row.content,
        parent_id: row.parent_id.map(RefinementId::from_uuid),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}
