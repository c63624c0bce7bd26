//! # feeds-plugin
//!
//! Host-facing side of the median reporting plugin.
//!
//! The host hands the plugin a pipeline configuration; the plugin validates
//! it, assembles a [`factory::MedianFactory`] and exposes it behind a
//! [`service::FactoryService`] with a start/close lifecycle.
//!
//! ## Modules
//!
//! - [`config`] — TOML and JSON plugin configuration
//! - [`factory`] — assembly of data sources, report codec and deviation function
//! - [`service`] — start/close lifecycle and health reporting

pub mod config;
pub mod factory;
pub mod service;
