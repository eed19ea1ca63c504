//! Tracing setup for embedders of the step assembler.
//!
//! Builders and the registry only emit `tracing` events; nothing is printed
//! unless the host calls [`init`] or installs its own subscriber.

pub mod config;

pub use config::{ConsoleOutput, LoggingConfig};

use crate::Result;
use anyhow::{anyhow, Context};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::Subscriber;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::{self as tracing_fmt, format, writer::BoxMakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::{LookupSpan, Registry};

static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

type ConsoleLayer<S> =
    tracing_fmt::Layer<S, format::DefaultFields, format::Format<format::Full>, BoxMakeWriter>;

/// Handle describing the subscriber installed by [`init`].
#[derive(Debug)]
pub struct LoggingGuard {
    config: LoggingConfig,
}

impl LoggingGuard {
    pub fn console_output(&self) -> ConsoleOutput {
        self.config.console_output
    }

    /// Level directive applied when `RUST_LOG` is unset.
    pub fn default_level(&self) -> &str {
        &self.config.default_level
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Errors when invoked more than once
/// per process unless tests explicitly reset the guard.
pub fn init(workspace_root: Option<&Path>) -> Result<LoggingGuard> {
    if LOGGER_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(anyhow!("logging already initialized"));
    }

    let config = match LoggingConfig::load(workspace_root) {
        Ok(config) => config,
        Err(err) => {
            LOGGER_INITIALIZED.store(false, Ordering::SeqCst);
            return Err(err);
        }
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_level))
        .context("failed to configure tracing level")?;

    tracing_subscriber::registry()
        .with(console_layer::<Registry>(config.console_output.make_writer()))
        .with(env_filter)
        .try_init()
        .context("failed to install global tracing subscriber")?;

    Ok(LoggingGuard { config })
}

fn console_layer<S>(writer: BoxMakeWriter) -> ConsoleLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
}

#[cfg(test)]
/// Reset the initialization guard so tests can reconfigure logging multiple times.
pub fn reset_for_tests() {
    LOGGER_INITIALIZED.store(false, Ordering::SeqCst);
}
