use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

const PROGRESS_THRESHOLD: u64 = 10;
const TEMPLATE: &str = "{prefix:.bold} {spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

pub struct ProgressReporter {
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    /// A bar labelled `prefix`, shown only for runs of at least ten files.
    pub fn new(prefix: &'static str, total: u64, enabled: bool) -> Self {
        if !enabled || total < PROGRESS_THRESHOLD {
            return Self { bar: None };
        }

        let style = match ProgressStyle::default_bar().template(TEMPLATE) {
            Ok(style) => style.progress_chars("=>-"),
            Err(e) => {
                debug!(error = %e, "falling back to default progress style");
                ProgressStyle::default_bar()
            }
        };

        let bar = ProgressBar::new(total);
        bar.set_style(style);
        bar.set_prefix(prefix);
        Self { bar: Some(bar) }
    }

    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }

    pub fn set_message(&self, msg: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(msg.to_string());
        }
    }

    pub fn inc(&self) {
        if let Some(ref bar) = self.bar {
            bar.inc(1);
        }
    }

    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
