//! CLI subcommand modules.
//!
//! This module contains the implementations for all salou CLI subcommands.

pub(crate) mod backtest;
pub(crate) mod metrics;
pub(crate) mod windows;
