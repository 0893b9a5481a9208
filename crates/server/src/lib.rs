//! Tableau provisioner backend library.
//!
//! Bulk-adds users from a dashboard worksheet to a Tableau Server or Tableau
//! Cloud site. Exposed as a library so the CLI and integration tests can
//! drive the same workflow the HTTP host does.
//!
//! # Security
//!
//! The settings store holds a Tableau account password able to add users to
//! a site. Set `PROVISIONER_API_TOKEN` whenever the host is reachable from
//! anything but the extension's own machine.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod tableau;
