// Copyright 2026 Prodex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Spinner display for long-running panel operations.
//!
//! Uses `indicatif` steady-tick spinners while a page is fetched or a
//! workflow endpoint is doing work, finishing into a result line.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a steady-tick spinner for a panel operation.
pub fn create_spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars("\u{25b8}\u{25b9}\u{25b8}\u{25b9}\u{25b8}"),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Replace the spinner with a completion line.
pub fn finish_done(bar: &ProgressBar, message: &str) {
    bar.set_style(ProgressStyle::with_template("  {msg}").unwrap());
    bar.set_message(format!("\x1b[32m\u{2713}\x1b[0m {message}"));
    bar.finish();
}

/// Replace the spinner with a failure line.
pub fn finish_failed(bar: &ProgressBar, message: &str) {
    bar.set_style(ProgressStyle::with_template("  {msg}").unwrap());
    bar.set_message(format!("\x1b[31m\u{2717}\x1b[0m {message}"));
    bar.finish();
}
