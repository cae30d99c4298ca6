mod cart;
mod category;
mod order;
mod product;
mod query;
mod review;
mod user;
mod wishlist;

use std::{fmt, marker::PhantomData, sync::Arc};

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, DatabaseBackend, DbErr, EntityTrait,
    IdenStatic, IntoActiveModel, Iterable, ModelTrait, PaginatorTrait, PrimaryKeyTrait,
    QueryFilter, QuerySelect, Select, sea_query::IntoCondition,
};
use uuid::Uuid;

use crate::{
    error::{DataError, DataResult},
    relations::{self, References, RowRef},
    session::{SessionFactory, SessionState},
};

pub use cart::{CartItemRepository, CartRepository};
pub use category::CategoryRepository;
pub use order::{DiscountCodeRepository, OrderDetailRepository, OrderRepository};
pub use product::{
    BrandRepository, ProductImageRepository, ProductRepository, ProductVariantImageRepository,
    ProductVariantRepository,
};
pub use query::Query;
pub use review::ReviewRepository;
pub use user::{RoleRepository, UserRepository, UserRoleRepository};
pub use wishlist::WishlistRepository;

pub trait Record: EntityTrait {
    type Key: Clone
        + fmt::Debug
        + Send
        + Sync
        + 'static
        + Into<<Self::PrimaryKey as PrimaryKeyTrait>::ValueType>;
    type Active: ActiveModelTrait<Entity = Self> + ActiveModelBehavior + Send + 'static;

    fn key(model: &Self::Model) -> Self::Key;

    fn key_parts(key: &Self::Key) -> Vec<Uuid>;
}

pub struct Repository<E> {
    factory: Arc<SessionFactory>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
            _entity: PhantomData,
        }
    }
}

impl<E> Repository<E>
where
    E: Record,
    E::Model: IntoActiveModel<E::Active> + PartialEq + Sync + 'static,
{
    pub fn new(factory: &Arc<SessionFactory>) -> Self {
        Self {
            factory: Arc::clone(factory),
            _entity: PhantomData,
        }
    }

    pub fn session_factory(&self) -> &Arc<SessionFactory> {
        &self.factory
    }

    /// Point lookup. `Ok(None)` when no row has this key.
    pub async fn get_by_id(&self, id: E::Key) -> DataResult<Option<E::Model>> {
        let session = self.factory.init().await?;
        let mut state = session.lock().await;
        let txn = state.transaction()?;
        let found = E::find_by_id(id).one(txn).await;
        let found = found.map_err(|err| state.fail(err.into()))?;
        if let Some(model) = &found {
            state.track(Self::row_ref(&E::key(model))?, model);
        }
        Ok(found)
    }

    pub fn get_all(&self) -> Query<'_, E> {
        self.query(E::find())
    }

    pub fn find<F: IntoCondition>(&self, filter: F) -> Query<'_, E> {
        self.query(E::find().filter(filter))
    }

    pub fn query(&self, select: Select<E>) -> Query<'_, E> {
        Query::new(self, select)
    }

    pub async fn add(&self, model: E::Model) -> DataResult<E::Model> {
        let session = self.factory.init().await?;
        let mut state = session.lock().await;
        let row = Self::row_ref(&E::key(&model))?;
        let outcome = Self::stage_insert(&state, &row, &model).await;
        let stored = outcome.map_err(|err| state.fail(err))?;
        state.track(row.clone(), &stored);
        tracing::debug!(session = %session.id(), row = %row, "insert staged");
        Ok(stored)
    }

    /// Fails with `ConcurrencyConflict` when the stored row no longer matches
    /// the copy this session last read or wrote.
    pub async fn update(&self, model: E::Model) -> DataResult<E::Model> {
        let session = self.factory.init().await?;
        let mut state = session.lock().await;
        let row = Self::row_ref(&E::key(&model))?;
        if !state.is_tracked(&row) {
            return Err(DataError::UntrackedEntity(row.to_string()));
        }
        let outcome = Self::stage_update(&state, &row, &model).await;
        let stored = outcome.map_err(|err| state.fail(err))?;
        state.track(row.clone(), &stored);
        tracing::debug!(session = %session.id(), row = %row, "update staged");
        Ok(stored)
    }

    pub async fn delete(&self, model: &E::Model) -> DataResult<()> {
        let session = self.factory.init().await?;
        let mut state = session.lock().await;
        let row = Self::row_ref(&E::key(model))?;
        if !state.is_tracked(&row) {
            return Err(DataError::UntrackedEntity(row.to_string()));
        }
        Self::stage_delete(&mut state, &row).await?;
        tracing::debug!(session = %session.id(), row = %row, "delete staged");
        Ok(())
    }

    /// `false` when there is no such row.
    pub async fn delete_by_id(&self, id: E::Key) -> DataResult<bool> {
        let session = self.factory.init().await?;
        let mut state = session.lock().await;
        let row = Self::row_ref(&id)?;
        if !state.is_tracked(&row) {
            let txn = state.transaction()?;
            let exists = relations::row_exists(txn, &row).await;
            if !exists.map_err(|err| state.fail(err))? {
                return Ok(false);
            }
        }
        Self::stage_delete(&mut state, &row).await?;
        tracing::debug!(session = %session.id(), row = %row, "delete staged");
        Ok(true)
    }

    pub(crate) async fn fetch(&self, select: Select<E>) -> DataResult<Vec<E::Model>> {
        let session = self.factory.init().await?;
        let mut state = session.lock().await;
        let txn = state.transaction()?;
        let rows = select.all(txn).await;
        let rows = rows.map_err(|err| state.fail(err.into()))?;
        for model in &rows {
            state.track(Self::row_ref(&E::key(model))?, model);
        }
        Ok(rows)
    }

    pub(crate) async fn fetch_count(&self, select: Select<E>) -> DataResult<u64> {
        let session = self.factory.init().await?;
        let mut state = session.lock().await;
        let txn = state.transaction()?;
        let count = select.count(txn).await;
        count.map_err(|err| state.fail(err.into()))
    }

    async fn stage_insert(
        state: &SessionState,
        row: &RowRef,
        model: &E::Model,
    ) -> DataResult<E::Model> {
        let txn = state.transaction()?;
        relations::check_insert(txn, row, &Self::references(model)?).await?;
        E::insert(Self::to_active(model))
            .exec_without_returning(txn)
            .await?;
        E::find_by_id(E::key(model))
            .one(txn)
            .await?
            .ok_or(DataError::OrmError(DbErr::RecordNotInserted))
    }

    async fn stage_update(
        state: &SessionState,
        row: &RowRef,
        model: &E::Model,
    ) -> DataResult<E::Model> {
        let txn = state.transaction()?;
        let snapshot = state
            .snapshot::<E::Model>(row)
            .ok_or_else(|| DataError::UntrackedEntity(row.to_string()))?;

        let mut current = E::find_by_id(E::key(model));
        if txn.get_database_backend() == DatabaseBackend::Postgres {
            current = current.lock_exclusive();
        }
        match current.one(txn).await? {
            Some(current) if &current == snapshot => {}
            Some(_) => {
                return Err(DataError::ConcurrencyConflict(format!(
                    "{row} was changed by another unit of work"
                )));
            }
            None => {
                return Err(DataError::ConcurrencyConflict(format!(
                    "{row} was removed by another unit of work"
                )));
            }
        }

        relations::check_references(txn, row, &Self::references(model)?).await?;
        Ok(E::update(Self::to_active(model)).exec(txn).await?)
    }

    async fn stage_delete(state: &mut SessionState, row: &RowRef) -> DataResult<()> {
        let txn = state.transaction()?;
        let outcome = relations::delete_cascading(txn, row).await;
        let removed = outcome.map_err(|err| state.fail(err))?;
        for row in &removed {
            state.forget(row);
        }
        Ok(())
    }

    fn table() -> DataResult<&'static str> {
        Ok(relations::table_def(E::default().table_name())?.name)
    }

    fn row_ref(key: &E::Key) -> DataResult<RowRef> {
        Ok(RowRef::new(Self::table()?, E::key_parts(key)))
    }

    fn references(model: &E::Model) -> DataResult<References> {
        let table = Self::table()?;
        relations::config()
            .references_from(table)
            .iter()
            .map(|foreign_key| {
                let column = E::Column::iter()
                    .find(|column| column.as_str() == foreign_key.column)
                    .ok_or_else(|| {
                        DataError::OrmError(DbErr::Custom(format!(
                            "`{table}` has no column `{}`",
                            foreign_key.column
                        )))
                    })?;
                let value =
                    <Option<Uuid> as sea_orm::sea_query::ValueType>::try_from(model.get(column))
                        .ok()
                        .flatten();
                Ok((*foreign_key, value))
            })
            .collect()
    }

    fn to_active(model: &E::Model) -> E::Active {
        let mut active = <E::Active as ActiveModelBehavior>::new();
        for column in E::Column::iter() {
            active.set(column, model.get(column));
        }
        active
    }
}
