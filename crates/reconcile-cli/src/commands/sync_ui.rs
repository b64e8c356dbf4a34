use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use reconcile_core::{FetchProgress, LogProgress};
use std::io::IsTerminal;

/// Episode fetch progress: a progress bar on a terminal, log lines otherwise
pub enum EpisodeProgress {
    Bar(ProgressBar),
    Log(LogProgress),
}

impl EpisodeProgress {
    pub fn new(show_bar: bool) -> Self {
        if show_bar && is_interactive() {
            let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            {
                bar.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
            }
            EpisodeProgress::Bar(bar)
        } else {
            tracing::debug!(
                operation = "ui_init",
                mode = "non_interactive",
                "Progress bar disabled, using structured logging"
            );
            EpisodeProgress::Log(LogProgress::default())
        }
    }
}

impl FetchProgress for EpisodeProgress {
    fn start(&self, total: usize) {
        match self {
            EpisodeProgress::Bar(bar) => {
                bar.set_length(total as u64);
                bar.set_position(0);
                bar.set_message("Fetching Sonarr episodes");
            }
            EpisodeProgress::Log(log) => log.start(total),
        }
    }

    fn advance(&self, title: &str) {
        match self {
            EpisodeProgress::Bar(bar) => {
                bar.set_message(title.to_string());
                bar.inc(1);
            }
            EpisodeProgress::Log(log) => log.advance(title),
        }
    }

    fn finish(&self) {
        match self {
            EpisodeProgress::Bar(bar) => bar.finish_with_message("Episodes fetched"),
            EpisodeProgress::Log(log) => log.finish(),
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
