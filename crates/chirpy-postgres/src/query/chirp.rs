//! Chirp repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{Chirp, NewChirp};
use crate::types::SortOrder;
use crate::{PgConnection, PgError, PgResult, schema};

/// Filter for listing chirps.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChirpFilter {
    /// Only return chirps written by this user.
    pub author_id: Option<Uuid>,
    /// Ordering on `created_at`.
    pub sort: SortOrder,
}

impl ChirpFilter {
    /// Restricts the listing to a single author.
    pub fn with_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    /// Sets the sort order.
    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }
}

/// Repository for chirp database operations.
pub trait ChirpRepository {
    /// Creates a new chirp.
    fn create_chirp(&mut self, new_chirp: NewChirp) -> impl Future<Output = PgResult<Chirp>> + Send;

    /// Finds a chirp by id.
    fn find_chirp_by_id(
        &mut self,
        chirp_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Chirp>>> + Send;

    /// Lists chirps ordered by creation time.
    fn list_chirps(
        &mut self,
        filter: ChirpFilter,
    ) -> impl Future<Output = PgResult<Vec<Chirp>>> + Send;

    /// Deletes a chirp, returning whether a row was removed.
    fn delete_chirp(&mut self, chirp_id: Uuid) -> impl Future<Output = PgResult<bool>> + Send;
}

impl ChirpRepository for PgConnection {
    async fn create_chirp(&mut self, new_chirp: NewChirp) -> PgResult<Chirp> {
        use schema::chirps;

        diesel::insert_into(chirps::table)
            .values(&new_chirp)
            .returning(Chirp::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_chirp_by_id(&mut self, chirp_id: Uuid) -> PgResult<Option<Chirp>> {
        use schema::chirps::{self, dsl};

        chirps::table
            .filter(dsl::id.eq(chirp_id))
            .select(Chirp::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_chirps(&mut self, filter: ChirpFilter) -> PgResult<Vec<Chirp>> {
        use schema::chirps::{self, dsl};

        let mut query = chirps::table.select(Chirp::as_select()).into_boxed();

        if let Some(author_id) = filter.author_id {
            query = query.filter(dsl::user_id.eq(author_id));
        }

        query = match filter.sort {
            SortOrder::Asc => query.order((dsl::created_at.asc(), dsl::id.asc())),
            SortOrder::Desc => query.order((dsl::created_at.desc(), dsl::id.desc())),
        };

        query.load(self).await.map_err(PgError::from)
    }

    async fn delete_chirp(&mut self, chirp_id: Uuid) -> PgResult<bool> {
        use schema::chirps::{self, dsl};

        let deleted = diesel::delete(chirps::table.filter(dsl::id.eq(chirp_id)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(deleted > 0)
    }
}
