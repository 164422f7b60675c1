//! Car Listings Dashboard - used-car ads CSV cleaning & interactive charts
//!
//! Loads a listings CSV once per session, median-fills `model_year` and
//! `odometer`, derives `manufacturer` from `model`, and builds histogram,
//! scatter, stacked bar and overlay charts behind checkboxes and selectors.

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod gui;
pub mod stats;
