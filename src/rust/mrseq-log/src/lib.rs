// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::sync::{atomic::AtomicBool, atomic::Ordering};

#[doc(hidden)]
pub use log as _log;

#[macro_export]
macro_rules! info {
    ($msg:literal, $($arg:tt)+) => {
        mrseq_log::_log::info!(target: concat!("mrseq.rust::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        mrseq_log::_log::info!(target: concat!("mrseq.rust::", module_path!()), $msg);
    };
}

#[macro_export]
macro_rules! warn {
    ($msg:literal, $($arg:tt)+) => {
        mrseq_log::_log::warn!(target: concat!("mrseq.rust::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        mrseq_log::_log::warn!(target: concat!("mrseq.rust::", module_path!()), $msg);
    };
}

#[macro_export]
macro_rules! debug {
    ($msg:literal, $($arg:tt)+) => {
        mrseq_log::_log::debug!(target: concat!("mrseq.rust::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        mrseq_log::_log::debug!(target: concat!("mrseq.rust::", module_path!()), $msg);
    };
}

/// Log a diagnostic message at info level if diagnostics logging is enabled.
///
/// Diagnostics cover the per-node details of building and rendering a
/// sequence (loop repetitions, segment counts), which are too chatty for
/// regular info output.
#[macro_export]
macro_rules! diagnostic {
    ($msg:literal, $($arg:tt)+) => {
        if mrseq_log::is_diagnostics_enabled() {
             mrseq_log::_log::info!(target: concat!("mrseq.rust::", module_path!()), $msg, $($arg)+);
        }
    };
    ($msg:literal) => {
        if mrseq_log::is_diagnostics_enabled() {
            mrseq_log::_log::info!(target: concat!("mrseq.rust::", module_path!()), $msg);
        }
    };
}

static DIAGNOSTICS_ENABLED: AtomicBool = AtomicBool::new(false);

#[inline]
pub fn is_diagnostics_enabled() -> bool {
    DIAGNOSTICS_ENABLED.load(Ordering::Acquire)
}

/// Initialize the logging.
///
/// This function is meant to be called once at the start of the program.
/// It does not install a concrete logger; binaries pick their own backend
/// (the `mrseq` CLI uses `env_logger`) and library users keep whatever logger
/// they already have. Only the diagnostics switch is set here.
pub fn init_logging(with_diagnostics: bool) {
    DIAGNOSTICS_ENABLED.store(with_diagnostics, Ordering::Release);
}
