// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Structured logging and operation timing
//!
//! Library code only emits `tracing` events. Binaries call [`init_tracing`]
//! once to get them on stderr; `RUST_LOG` takes precedence over the
//! verbosity level passed in.

use std::time::Instant;
use tracing::{debug, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr subscriber. Safe to call more than once.
pub fn init_tracing(verbosity: u8) {
    let fallback = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .try_init();
}

/// Times an operation and logs its duration when finished or dropped.
///
/// ```rust,ignore
/// let _timer = OperationTimer::with_context("cut", mesh.triangle_count(), mesh.vertex_count());
/// // ... work ...
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
    finished: bool,
}

impl OperationTimer {
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("katana_operation", operation = name);
        debug!(target: "katana::timing", operation = name, "starting operation");
        Self {
            name,
            start: Instant::now(),
            span,
            finished: false,
        }
    }

    /// Timer whose span also carries mesh dimensions
    pub fn with_context(name: &'static str, triangle_count: usize, vertex_count: usize) -> Self {
        let span = tracing::info_span!(
            "katana_operation",
            operation = name,
            triangles = triangle_count,
            vertices = vertex_count
        );
        debug!(
            target: "katana::timing",
            operation = name,
            triangles = triangle_count,
            vertices = vertex_count,
            "starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
            finished: false,
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Log now and return the elapsed milliseconds
    pub fn finish(mut self) -> f64 {
        let elapsed = self.elapsed_ms();
        self.log(elapsed);
        self.finished = true;
        elapsed
    }

    fn log(&self, elapsed_ms: f64) {
        let _enter = self.span.enter();
        debug!(
            target: "katana::timing",
            operation = self.name,
            elapsed_ms,
            "operation completed"
        );
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        if !self.finished {
            self.log(self.elapsed_ms());
        }
    }
}
