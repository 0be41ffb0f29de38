//! Geographic lookup over US postal codes.
//!
//! A dataset of location records is loaded once into a key-value cache
//! (in-process or networked), with derived per-city and per-state indices.
//! Queries then answer: "where is this code?", "which codes does this city
//! cover?", and "which cities do these codes belong to?"

pub mod aggregate;
pub mod builder;
pub mod config;
pub mod dataset;
pub mod domain;
pub mod query;
pub mod ranges;
pub mod store;
pub mod web;
