//! parcelnorm Core - Domain models, error taxonomy, and configuration
//!
//! This crate contains the canonical parcel types shared by the geometry
//! pipeline and its adapters.

pub mod config;
pub mod error;
pub mod models;

pub use error::{ParcelError, Result};
