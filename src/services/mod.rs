pub mod context;
pub mod task_service;

pub use context::ServiceContext;
pub use task_service::{TaskPage, TaskService};
