//! Concrete adapter implementations for ports.

pub mod file_config_adapter;
pub mod file_ledger_adapter;
pub mod matrix_file_adapter;
pub mod memory_ledger_adapter;
