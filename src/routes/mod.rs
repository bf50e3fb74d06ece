mod entry;
pub mod health;
pub mod tasks;

pub use entry::{app, router, with_layers};
