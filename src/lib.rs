//! Reddit thread fetcher library.
//!
//! An HTTP service that fetches batches of Reddit threads through the app-only
//! OAuth API (falling back to the public JSON endpoint) and returns each one as
//! a normalized post plus a flat, depth-annotated comment list.

pub mod auth;
pub mod config;
pub mod constants;
pub mod reddit;
pub mod web;
