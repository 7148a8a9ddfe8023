//! Landslide dashboard daemon: HTTP view over a refresh session

pub mod api;
pub mod config;
