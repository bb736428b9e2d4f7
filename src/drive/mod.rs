//! Google Drive remote store

pub mod client;
pub mod types;

pub use client::{Credentials, DriveConnector};
