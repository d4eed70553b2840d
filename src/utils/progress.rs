use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while the warehouse is working. Silent spinners (JSON
/// output, non-interactive runs) never draw anything.
pub struct QuerySpinner {
    bar: Option<ProgressBar>,
}

impl QuerySpinner {
    pub fn start(message: &str, silent: bool) -> Self {
        if silent {
            return Self { bar: None };
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { bar: Some(pb) }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.bar {
            pb.set_message(message.to_string());
        }
    }

    pub fn finish_and_clear(&self) {
        if let Some(ref pb) = self.bar {
            pb.finish_and_clear();
        }
    }

    pub fn is_silent(&self) -> bool {
        self.bar.is_none()
    }
}

impl Drop for QuerySpinner {
    fn drop(&mut self) {
        if let Some(ref pb) = self.bar {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_spinner_draws_nothing() {
        let spinner = QuerySpinner::start("Querying warehouse...", true);
        assert!(spinner.is_silent());
        spinner.set_message("still going");
        spinner.finish_and_clear();
    }
}
