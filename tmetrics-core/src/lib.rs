pub mod config;
pub mod constants;
pub mod error;
pub mod guard;
pub mod schema;

pub use error::{AgentError, Result};
