mod context;
pub mod error;
pub mod task_dao;

pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use task_dao::{TaskDao, TaskFilter};
