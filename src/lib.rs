// src/lib.rs

//! tag-sync library
//!
//! Keeps a discount tag present exactly on the catalog products that
//! qualify for it.

pub mod client;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
