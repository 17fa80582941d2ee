//! Progress bar display for shadow copies

use indicatif::{ProgressBar, ProgressStyle};

/// File-level progress for a shadow copy run
pub struct CopyProgress {
    pb: ProgressBar,
}

impl CopyProgress {
    /// Create a progress bar over the total file count
    pub fn new(total_files: u64) -> Self {
        let style = ProgressStyle::default_bar()
            .template("  [{bar:40.green/yellow}] {pos}/{len} files {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let pb = ProgressBar::new(total_files);
        pb.set_style(style);

        Self { pb }
    }

    /// Advance past one copied file
    pub fn tick(&self, file_path: &str) {
        // Truncate long paths for display
        let display_path = if file_path.len() > 50 {
            format!("...{}", &file_path[file_path.len() - 47..])
        } else {
            file_path.to_string()
        };
        self.pb.set_message(display_path);
        self.pb.inc(1);
    }

    /// Remove the bar once the copy completes
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}
