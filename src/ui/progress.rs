use crate::ui::icons::{CHECK, CROSS};
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::{Duration, Instant};

/// Spinner shown while a compaction request is in flight.
///
/// Drawn on stderr; hidden entirely in plain mode so scripted runs only
/// see the result on stdout.
pub struct RequestSpinner {
    bar: ProgressBar,
    started: Instant,
}

impl RequestSpinner {
    pub fn start(message: impl Into<String>, plain: bool) -> Self {
        let bar = if plain {
            ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden())
        } else {
            ProgressBar::new_spinner()
        };
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} {elapsed:.dim}") {
            bar.set_style(spinner_style);
        }
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self {
            bar,
            started: Instant::now(),
        }
    }

    pub fn success(self, msg: &str) {
        let secs = self.started.elapsed().as_secs_f32();
        self.bar.finish_and_clear();
        if !self.bar.is_hidden() {
            eprintln!("{}{} {}", CHECK, msg, style(format!("({:.1}s)", secs)).dim());
        }
    }

    pub fn failure(self, msg: &str) {
        self.bar.finish_and_clear();
        if !self.bar.is_hidden() {
            eprintln!("{}{}", CROSS, style(msg).red());
        }
    }
}
