use sea_orm::{
    EntityTrait, IntoActiveModel, IntoSimpleExpr, QueryFilter, QueryOrder, QuerySelect, Select,
    sea_query::IntoCondition,
};

use super::{Record, Repository};
use crate::error::DataResult;

/// Lazy selection; `all`, `one` and `count` re-run it each time.
pub struct Query<'r, E: EntityTrait> {
    repo: &'r Repository<E>,
    select: Select<E>,
}

impl<'r, E> Query<'r, E>
where
    E: Record,
    E::Model: IntoActiveModel<E::Active> + PartialEq + Sync + 'static,
{
    pub(super) fn new(repo: &'r Repository<E>, select: Select<E>) -> Self {
        Self { repo, select }
    }

    pub fn filter<F: IntoCondition>(mut self, filter: F) -> Self {
        self.select = self.select.filter(filter);
        self
    }

    pub fn order_by_asc<C: IntoSimpleExpr>(mut self, column: C) -> Self {
        self.select = self.select.order_by_asc(column);
        self
    }

    pub fn order_by_desc<C: IntoSimpleExpr>(mut self, column: C) -> Self {
        self.select = self.select.order_by_desc(column);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.select = self.select.limit(limit);
        self
    }

    pub async fn all(&self) -> DataResult<Vec<E::Model>> {
        self.repo.fetch(self.select.clone()).await
    }

    pub async fn one(&self) -> DataResult<Option<E::Model>> {
        let mut rows = self.repo.fetch(self.select.clone().limit(1)).await?;
        Ok(rows.pop())
    }

    pub async fn count(&self) -> DataResult<u64> {
        self.repo.fetch_count(self.select.clone()).await
    }

    pub fn into_select(self) -> Select<E> {
        self.select
    }
}
