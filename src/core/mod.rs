//! Core module - configuration, events, and error taxonomies

pub mod config;
pub mod error;
pub mod events;
