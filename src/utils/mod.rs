use std::time::Instant;
use tracing::info;

/// Wall-clock timer that logs its lifetime; used around each symbol's fetch
/// and the run as a whole.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("⏱  {}: started", label);
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!("⏱  {}: done in {:.2?}", self.label, self.start.elapsed());
    }
}
