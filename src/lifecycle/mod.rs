//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Logging/metrics → Chain client → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → broadcast → stop accepting → drain in-flight requests → exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
