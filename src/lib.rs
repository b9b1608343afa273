// src/lib.rs
// DOCUMENTATION: Library root shared by the server and migrate binaries

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
