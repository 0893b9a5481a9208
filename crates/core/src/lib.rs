//! Tableau Provisioner Core - Shared types library.
//!
//! This crate provides the types shared by every provisioner component:
//! - `server` - HTTP host for the dashboard extension and the provisioning workflow
//! - `cli` - Command-line tools for migrations, settings, and headless runs
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Site roles, user records and outcomes, extension settings,
//!   worksheet data tables, and notifications

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
