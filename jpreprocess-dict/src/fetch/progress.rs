//! Progress reporting for archive downloads.
//!
//! Progress is a soft dependency: the fetcher only sees the [`ProgressSink`]
//! trait, and [`NoProgress`] is used whenever nothing better is available. The
//! terminal bar is compiled in only with the `progress-bar` feature.

/// Receives byte-level progress while an archive is written to temporary storage.
///
/// Every method has a no-op default except [`on_chunk`](Self::on_chunk).
pub trait ProgressSink {
    /// Called once before the first chunk, with the server-reported size if any.
    fn on_start(&self, _total: Option<u64>) {}

    /// Called after every chunk written.
    ///
    /// # Arguments
    ///
    /// * `bytes_written` - Total bytes written so far
    /// * `total` - Expected size, or `None` when the server did not say
    fn on_chunk(&self, bytes_written: u64, total: Option<u64>);

    /// Called once after the last chunk.
    fn on_finish(&self, _bytes_written: u64) {}
}

/// Discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_chunk(&self, _bytes_written: u64, _total: Option<u64>) {}
}

/// Forwards chunk progress to a closure.
pub struct CallbackProgress<F>
where
    F: Fn(u64, Option<u64>),
{
    callback: F,
}

impl<F> CallbackProgress<F>
where
    F: Fn(u64, Option<u64>),
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressSink for CallbackProgress<F>
where
    F: Fn(u64, Option<u64>),
{
    fn on_chunk(&self, bytes_written: u64, total: Option<u64>) {
        (self.callback)(bytes_written, total);
    }
}

#[cfg(feature = "progress-bar")]
mod bar {
    use indicatif::{ProgressBar, ProgressStyle};

    use super::ProgressSink;

    const BAR_TEMPLATE: &str =
        "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, ETA: {eta})";
    const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg} {bytes} ({bytes_per_sec})";

    /// Terminal progress bar on stderr. Hidden automatically when stderr is
    /// not a terminal.
    pub struct BarProgress {
        bar: ProgressBar,
    }

    impl BarProgress {
        pub fn new(label: impl Into<String>) -> Self {
            let bar = ProgressBar::no_length();
            bar.set_message(label.into());
            Self { bar }
        }
    }

    impl ProgressSink for BarProgress {
        fn on_start(&self, total: Option<u64>) {
            match total {
                Some(total) => {
                    self.bar.set_length(total);
                    self.bar.set_style(
                        ProgressStyle::with_template(BAR_TEMPLATE)
                            .unwrap_or_else(|_| ProgressStyle::default_bar())
                            .progress_chars("=>-"),
                    );
                }
                None => {
                    self.bar.set_style(
                        ProgressStyle::with_template(SPINNER_TEMPLATE)
                            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                    );
                }
            }
        }

        fn on_chunk(&self, bytes_written: u64, _total: Option<u64>) {
            self.bar.set_position(bytes_written);
        }

        fn on_finish(&self, bytes_written: u64) {
            // Unknown-length downloads end with the real size as total
            if self.bar.length().is_none() {
                self.bar.set_length(bytes_written);
            }
            self.bar.finish_and_clear();
        }
    }
}

#[cfg(feature = "progress-bar")]
pub use bar::BarProgress;

/// The best progress sink available in this build.
///
/// With the `progress-bar` feature this is a [`BarProgress`] labelled with
/// `label`; otherwise downloads proceed silently.
pub fn default_sink(label: &str) -> Box<dyn ProgressSink> {
    #[cfg(feature = "progress-bar")]
    {
        Box::new(BarProgress::new(label))
    }
    #[cfg(not(feature = "progress-bar"))]
    {
        let _ = label;
        Box::new(NoProgress)
    }
}
