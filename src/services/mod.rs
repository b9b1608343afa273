// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod gallery_service;
pub mod media_storage;

pub use gallery_service::*;
pub use media_storage::*;
