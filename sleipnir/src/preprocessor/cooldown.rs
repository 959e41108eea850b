use std::time::Duration;

/// Keeps a maneuver from restarting right after it ended.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cooldown {
    duration: Duration,
    finished_at: Option<Duration>,
}

impl Cooldown {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            finished_at: None,
        }
    }

    /// Whether the cooldown elapsed, or never started.
    #[must_use]
    pub fn is_ready(&self, now: Duration) -> bool {
        self.finished_at
            .is_none_or(|finished_at| now >= finished_at + self.duration)
    }

    pub fn restart(&mut self, now: Duration) {
        self.finished_at = Some(now);
    }

    pub fn clear(&mut self) {
        self.finished_at = None;
    }
}
