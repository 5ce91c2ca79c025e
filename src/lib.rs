// src/lib.rs

//! School schedule updater library
//!
//! Reconciles freshly scraped schedule snapshots against the last committed
//! ones and produces minimal diff documents for push delivery.

pub mod encoding;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
