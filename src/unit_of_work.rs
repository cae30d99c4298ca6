use std::{future::Future, sync::Arc};

use sea_orm::DatabaseConnection;

use crate::{error::DataResult, session::SessionFactory};

pub struct UnitOfWork {
    factory: Arc<SessionFactory>,
}

impl UnitOfWork {
    pub fn new(factory: Arc<SessionFactory>) -> Self {
        Self { factory }
    }

    pub fn session_factory(&self) -> &Arc<SessionFactory> {
        &self.factory
    }

    /// No-op when nothing opened the session; `SessionClosed` on a second call.
    pub async fn commit(&self) -> DataResult<()> {
        if !self.factory.is_initialized() {
            tracing::debug!("nothing staged, commit skipped");
            return Ok(());
        }
        let session = self.factory.init().await?;
        session.commit().await
    }

    pub async fn dispose(&self) {
        self.factory.dispose().await;
    }
}

/// Runs `work` on a fresh factory and disposes it on every exit path.
pub async fn scoped<T, E, F, Fut>(conn: &DatabaseConnection, work: F) -> Result<T, E>
where
    F: FnOnce(Arc<SessionFactory>) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let factory = SessionFactory::new(conn.clone());
    let outcome = work(Arc::clone(&factory)).await;
    factory.dispose().await;
    outcome
}
