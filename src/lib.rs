//! # Formapilot API Library
//!
//! This library provides the core functionality for the Formapilot admin API:
//! rendez-vous lifecycle, field normalization, repositories, handlers and
//! server configuration.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod normalization;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod telemetry;
pub use migration;
