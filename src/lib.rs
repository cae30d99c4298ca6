pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod migration;
pub mod relations;
pub mod repository;
pub mod session;
pub mod unit_of_work;

pub use error::{DataError, DataResult};
pub use repository::{Query, Record, Repository};
pub use session::{Session, SessionFactory};
pub use unit_of_work::UnitOfWork;
