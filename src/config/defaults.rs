pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;
pub const DEFAULT_RUST_LOG: &str = "info,tower_http=info";
pub const DEFAULT_DATABASE_PATH: &str = "./data/tasks.db";
pub const IN_MEMORY_DATABASE_PATH: &str = ":memory:";
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "*";
