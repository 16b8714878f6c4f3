use std::sync::OnceLock;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::ui;

/// Per-stage spinner; a no-op when progress display is off.
pub struct Progress {
    bar: Option<ProgressBar>,
}

static MULTI_PROGRESS: OnceLock<MultiProgress> = OnceLock::new();

fn multi_progress() -> &'static MultiProgress {
    MULTI_PROGRESS.get_or_init(MultiProgress::new)
}

impl Progress {
    #[must_use]
    pub fn spinner(message: &str) -> Self {
        if !ui::prefs().progress {
            return Self { bar: None };
        }

        let bar = multi_progress().add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        Self { bar: Some(bar) }
    }

    pub fn finish_ok(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.finish_with_message(message.to_string());
        }
    }

    pub fn finish_err(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.abandon_with_message(message.to_string());
        }
    }
}

/// Run `stage` under a spinner, closing it with the outcome.
pub fn with_spinner<T>(
    message: &str,
    done: impl FnOnce(&T) -> String,
    stage: impl FnOnce() -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let progress = Progress::spinner(message);
    match stage() {
        Ok(value) => {
            progress.finish_ok(&done(&value));
            Ok(value)
        }
        Err(error) => {
            progress.finish_err(&format!("{message} failed"));
            Err(error)
        }
    }
}
