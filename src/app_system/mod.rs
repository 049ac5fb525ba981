//! System orchestration, configuration, startup, and shutdown logic.

pub mod config;
pub mod seed;
pub mod shop_system;
pub mod tracing;

pub use config::*;
pub use seed::*;
pub use shop_system::*;
pub use self::tracing::setup_tracing;
