pub mod connection;
pub mod migrations;

pub use connection::{DatabaseManager, DatabaseStats, get_database_pool, get_database_pool_with_config};
pub use migrations::run_migrations;
