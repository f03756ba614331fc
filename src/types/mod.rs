//! Domain-based type organization
//!
//! - network: committed network configuration and its parts
//! - reconciler: states, rejections and outcomes of the settings state machine

pub mod network;
pub mod reconciler;

pub use network::*;
pub use reconciler::*;
