//! Settings for the configuration service itself.
//!
//! # Data Flow
//! ```text
//! settings file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceSettings (immutable for the service lifetime)
//! ```
//!
//! Every field has a default, so an absent file means "use defaults".

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{EnvironmentSettings, ReloadSettings, ReloadTrigger, ServiceSettings};
