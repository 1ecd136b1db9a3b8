//! # Data Models
//!
//! This module contains all the SeaORM entity models used throughout the
//! Formapilot API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod programme;
pub mod rendezvous;
pub mod user;
pub mod veille_item;

pub use programme::Entity as Programme;
pub use rendezvous::Entity as Rendezvous;
pub use user::Entity as User;
pub use veille_item::Entity as VeilleItem;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "formapilot".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
