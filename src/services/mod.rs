//! Business logic services
//!
//! This module contains the services that talk to collaborators outside the
//! settings state machine.

pub mod network;
