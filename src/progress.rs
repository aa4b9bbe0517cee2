use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::{Duration, Instant};

/// Terminal progress bar for one task. The 0-100 scale is the placeholder
/// state scale, not a byte count; it switches to byte display once the
/// result file is being fetched.
pub struct TaskProgress {
    pub name: String,
    bar: ProgressBar,
    start_time: Instant,
}

impl TaskProgress {
    pub fn new(task_id: &str, multi: &MultiProgress) -> Self {
        let bar = multi.add(ProgressBar::new(100));
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {percent:>3}% {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));

        Self {
            name: format!("Task-{task_id}"),
            bar,
            start_time: Instant::now(),
        }
    }

    pub fn update(&self, percent: u8, message: &str) {
        self.bar.set_position(percent as u64);
        self.bar.set_message(format!("{} | {}", self.name, message));
    }

    pub fn start_fetch(&self, total: u64) {
        self.bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar
            .set_message(format!("{} | Downloading result", self.name));
    }

    pub fn fetched(&self, received: u64, total: u64) {
        if total > 0 {
            self.bar.set_length(total);
        }
        self.bar.set_position(received);
    }

    pub fn finish(&self, path: &Path) {
        self.bar.finish_with_message(format!(
            "{} saved to {} in {}",
            self.name,
            path.display(),
            humantime::format_duration(Duration::from_secs(self.start_time.elapsed().as_secs()))
        ));
    }

    pub fn fail(&self, message: &str) {
        self.bar
            .abandon_with_message(format!("{} failed: {}", self.name, message));
    }
}
