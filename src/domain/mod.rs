//! Core domain types and logic.

pub mod price;
pub mod news;
pub mod generator;
pub mod indicator;
pub mod portfolio;
pub mod ledger;
pub mod execution;
pub mod strategy;
pub mod selection;
pub mod ledger_summary;
pub mod config_validation;
pub mod error;
