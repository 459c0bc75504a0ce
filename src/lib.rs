//! A small append-only guestbook.
//!
//! Visitors post short messages and see them newest first, grouped by day.
//! An operator holding the admin key may delete messages.
//!
//! - [`storage`]: durable message store (SQLite).
//! - [`gateway`]: validates and applies mutations, admin gate, read cache.
//! - [`network`]: HTTP server and client for the gateway, plus the background
//!   client loop the UI talks to over channels.
//! - [`ui`]: optimistic display state and the egui front end.

pub mod common;
pub mod config;
pub mod gateway;
pub mod network;
pub mod storage;
pub mod ui;
