//! Hierarchical configuration service.
//!
//! # Architecture Overview
//!
//! ```text
//!   dspace.cfg ──┐
//!   includes  ───┤   source     ┌──────────┐  ArcSwap   ┌─────────────┐
//!   modules/* ───┼─▶ loader ───▶│ Snapshot │──────────▶ │ accessors   │──▶ callers
//!   local.cfg ───┤   + env      └──────────┘  (swap)    │ interpolate │
//!   environment ─┘                   ▲                  └─────────────┘
//!                                    │
//!                     reload supervisor (poll / events, started by build)
//!                     set / load / clear (copy + swap)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use hier_config::ConfigurationService;
//!
//! let config = ConfigurationService::init(None)?;
//! let admin = config.get("mail.admin")?;
//! let orcid = config.module(Some("authentication-orcid"));
//! let self_register = orcid.get_boolean("can-self-register")?;
//! # Ok::<(), hier_config::ConfigError>(())
//! ```

pub mod access;
pub mod error;
pub mod interpolate;
pub mod lifecycle;
pub mod observability;
pub mod reload;
pub mod service;
pub mod settings;
pub mod source;
pub mod store;

pub use access::{ScopedConfig, TargetType, TypedValue};
pub use error::{ConfigError, Result};
pub use service::{ConfigEvent, ConfigurationService, ReloadKind, ServiceBuilder};
pub use settings::ServiceSettings;
pub use store::{RawEntry, Snapshot, SnapshotDiff};
