mod check_sql;
mod config;
mod schema;

// Schema commands
pub use schema::{run_guide, run_schema, run_static_schema};

// SQL guard commands
pub use check_sql::run_check_sql;

// Config commands
pub use config::{run_config_init, run_config_show};
