use std::{any::Any, collections::HashMap, sync::Arc};

use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction, IsolationLevel,
    TransactionTrait,
};
use tokio::sync::{Mutex, MutexGuard, OnceCell};
use uuid::Uuid;

use crate::{
    error::{DataError, DataResult},
    relations::RowRef,
};

pub struct SessionFactory {
    conn: DatabaseConnection,
    session: OnceCell<Arc<Session>>,
}

impl SessionFactory {
    pub fn new(conn: DatabaseConnection) -> Arc<Self> {
        Arc::new(Self {
            conn,
            session: OnceCell::new(),
        })
    }

    /// Opens the session on the first call and returns the same one afterwards.
    pub async fn init(&self) -> DataResult<Arc<Session>> {
        let session = self
            .session
            .get_or_try_init(|| Session::open(&self.conn))
            .await?;
        Ok(Arc::clone(session))
    }

    pub fn is_initialized(&self) -> bool {
        self.session.initialized()
    }

    pub async fn dispose(&self) {
        if let Some(session) = self.session.get() {
            session.dispose().await;
        }
    }
}

pub struct Session {
    id: Uuid,
    state: Mutex<SessionState>,
}

impl Session {
    async fn open(conn: &DatabaseConnection) -> DataResult<Arc<Session>> {
        // Postgres runs read committed; lost updates are caught by the
        // repository's snapshot comparison, not by the isolation level.
        let isolation = match conn.get_database_backend() {
            DatabaseBackend::Postgres => Some(IsolationLevel::ReadCommitted),
            _ => None,
        };
        let transaction = conn
            .begin_with_config(isolation, None)
            .await
            .map_err(|err| DataError::Resource(err.to_string()))?;

        let id = Uuid::new_v4();
        tracing::debug!(session = %id, "session opened");
        Ok(Arc::new(Session {
            id,
            state: Mutex::new(SessionState {
                transaction: Some(transaction),
                tracked: HashMap::new(),
                aborted: None,
            }),
        }))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn is_open(&self) -> bool {
        self.state.lock().await.transaction.is_some()
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    pub(crate) async fn commit(&self) -> DataResult<()> {
        let mut state = self.state.lock().await;
        let transaction = state.transaction.take().ok_or(DataError::SessionClosed)?;
        let tracked = state.tracked.len();
        state.tracked.clear();

        if let Some(err) = state.aborted.take() {
            if let Err(rollback_err) = transaction.rollback().await {
                tracing::warn!(session = %self.id, error = %rollback_err, "rollback failed");
            }
            tracing::info!(session = %self.id, error = %err, "commit rejected, unit of work rolled back");
            return Err(err);
        }

        match transaction.commit().await {
            Ok(()) => {
                tracing::info!(session = %self.id, tracked, "unit of work committed");
                Ok(())
            }
            Err(err) => {
                let err = DataError::from(err);
                tracing::warn!(session = %self.id, error = %err, "commit failed");
                Err(err)
            }
        }
    }

    pub(crate) async fn dispose(&self) {
        let mut state = self.state.lock().await;
        state.tracked.clear();
        state.aborted = None;
        if let Some(transaction) = state.transaction.take() {
            match transaction.rollback().await {
                Ok(()) => tracing::info!(session = %self.id, "session disposed, staged work discarded"),
                Err(err) => tracing::warn!(session = %self.id, error = %err, "session dispose failed"),
            }
        }
    }
}

pub(crate) struct SessionState {
    transaction: Option<DatabaseTransaction>,
    tracked: HashMap<RowRef, Box<dyn Any + Send + Sync>>,
    aborted: Option<DataError>,
}

impl SessionState {
    pub(crate) fn transaction(&self) -> DataResult<&DatabaseTransaction> {
        self.transaction.as_ref().ok_or(DataError::SessionClosed)
    }

    pub(crate) fn track<M>(&mut self, row: RowRef, model: &M)
    where
        M: Clone + Send + Sync + 'static,
    {
        self.tracked.insert(row, Box::new(model.clone()));
    }

    pub(crate) fn is_tracked(&self, row: &RowRef) -> bool {
        self.tracked.contains_key(row)
    }

    pub(crate) fn snapshot<M: 'static>(&self, row: &RowRef) -> Option<&M> {
        self.tracked.get(row).and_then(|model| model.downcast_ref::<M>())
    }

    pub(crate) fn forget(&mut self, row: &RowRef) {
        self.tracked.remove(row);
    }

    /// Marks the unit of work as failed when `err` makes a commit unsafe.
    pub(crate) fn fail(&mut self, err: DataError) -> DataError {
        if self.aborted.is_none() {
            if let Some(replay) = err.aborts_unit_of_work() {
                tracing::warn!(error = %err, "staging failed, unit of work will not commit");
                self.aborted = Some(replay);
            }
        }
        err
    }
}
