#[allow(unused_imports)]
pub mod prelude {
    pub use super::task::Entity as Task;
}

pub mod task;
