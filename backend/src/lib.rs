//! Image gallery service over object storage

#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

pub mod gallery;
pub mod routes;
pub mod server;
pub mod types;
pub mod ui;
