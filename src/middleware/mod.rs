mod cors;
mod error_envelope;
mod panic;

pub use cors::cors_layer;
pub use error_envelope::error_envelope_middleware;
pub use panic::catch_panic_layer;
