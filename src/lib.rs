//! Client for the sales-agent ordering API.
//!
//! [`state`] holds the offer being composed, [`submission`] sends it,
//! [`api`] talks to the backend.

pub mod api;
pub mod catalog;
pub mod config;
pub mod state;
pub mod submission;
