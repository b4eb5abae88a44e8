//! Rendimentos - Brazilian fixed-income rates and projections
//!
//! This library fetches the SELIC, CDI and IPCA series from Banco Central,
//! derives monthly rates for common fixed-income products, and projects
//! growth, savings goals and product comparisons on top of them.

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod comparison;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod projection;
pub mod rates;
pub mod session;
pub mod ui;
pub mod utils;
