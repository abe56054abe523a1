//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Start:    service built → reload supervisor subscribes to Shutdown
//! Stop:     service.shutdown() or last handle dropped → Shutdown::trigger → task exits
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
