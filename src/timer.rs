//! Game clock. Counts wall time between `start` and `stop`.

use std::time::{Duration, Instant};

#[derive(Clone, Debug, Default)]
pub struct GameTimer {
    started: Option<Instant>,
    banked: Duration,
}

impl GameTimer {
    pub fn new() -> Self {
        GameTimer::default()
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// No-op if already running.
    pub fn start(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    pub fn stop(&mut self) {
        if let Some(t) = self.started.take() {
            self.banked += t.elapsed();
        }
    }

    pub fn reset(&mut self) {
        self.started = None;
        self.banked = Duration::ZERO;
    }

    pub fn elapsed(&self) -> Duration {
        self.banked + self.started.map_or(Duration::ZERO, |t| t.elapsed())
    }

    /// Whole seconds; what highscores are ranked by.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed().as_secs()
    }

    /// `mm:ss`, as shown next to the board.
    pub fn display(&self) -> String {
        let secs = self.elapsed_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_timer_reads_zero() {
        let t = GameTimer::new();
        assert!(!t.is_running());
        assert_eq!(t.elapsed(), Duration::ZERO);
        assert_eq!(t.display(), "00:00");
    }

    #[test]
    fn stop_freezes_and_reset_clears() {
        let mut t = GameTimer::new();
        t.start();
        assert!(t.is_running());
        std::thread::sleep(Duration::from_millis(5));
        t.stop();
        let frozen = t.elapsed();
        assert!(frozen >= Duration::from_millis(5));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(t.elapsed(), frozen);

        t.reset();
        assert_eq!(t.elapsed(), Duration::ZERO);
    }
}
