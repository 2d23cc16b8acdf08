//! FeeDesk Common Types
//!
//! Currency metadata, display formatting and shared types used across the
//! FeeDesk workspace.

pub mod config;
pub mod currency;
pub mod error;
pub mod format;
pub mod identifiers;
pub mod monetary;
pub mod registry;

pub use config::*;
pub use currency::*;
pub use error::*;
pub use format::*;
pub use identifiers::*;
pub use monetary::*;
pub use registry::*;
