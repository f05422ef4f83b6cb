// src/lib.rs

//! Harvester library: incremental, date-windowed crawling of paginated
//! article feeds, with keyword ranking of the harvested articles.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;
