//! City weather browser
//!
//! Paginated city table with country filter and column sort, plus a
//! current-weather report for the selected city. The library exposes the
//! store pieces so they can be tested without a terminal.

pub mod action;
pub mod api;
pub mod components;
pub mod effect;
pub mod filter;
pub mod notify;
pub mod pagination;
pub mod reducer;
pub mod sort;
pub mod state;
pub mod tasks;
