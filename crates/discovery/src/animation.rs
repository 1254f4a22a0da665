//! Single-flight guard for cluster animations.
//!
//! While a merge animation is running, zoom-triggered reclustering is
//! dropped rather than queued. The guard returns to idle when the timer
//! callback fires, or when `poll` observes that the window has passed.

use std::time::{Duration, Instant};

/// Animation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationGuard {
    /// Reclustering is allowed
    #[default]
    Idle,
    /// An animation window is open
    Animating {
        /// When the window opened
        started: Instant,
        /// When it closes
        until: Instant,
    },
}

impl AnimationGuard {
    /// Open an animation window unless one is already open.
    ///
    /// Returns `false`, leaving the state untouched, if the guard is busy
    /// at `now`.
    pub fn try_begin(&mut self, now: Instant, duration: Duration) -> bool {
        if self.poll(now) {
            return false;
        }
        *self = Self::Animating {
            started: now,
            until: now + duration,
        };
        true
    }

    /// Timer callback: the animation finished.
    pub fn timer_fired(&mut self) {
        *self = Self::Idle;
    }

    /// True if an animation is in flight at `now`.
    ///
    /// A window that has already closed resets the guard, which covers a
    /// timer that never fired.
    pub fn poll(&mut self, now: Instant) -> bool {
        match *self {
            Self::Animating { until, .. } if now < until => true,
            Self::Animating { .. } => {
                *self = Self::Idle;
                false
            }
            Self::Idle => false,
        }
    }

    /// Time since the window opened, if one is open.
    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        match *self {
            Self::Animating { started, .. } => Some(now.saturating_duration_since(started)),
            Self::Idle => None,
        }
    }

    /// True in the `Idle` state.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(800);

    #[test]
    fn test_begin_then_drop_events() {
        let t0 = Instant::now();
        let mut guard = AnimationGuard::default();
        assert!(guard.is_idle());

        assert!(guard.try_begin(t0, WINDOW));
        assert!(!guard.try_begin(t0 + Duration::from_millis(100), WINDOW));
        assert!(!guard.try_begin(t0 + Duration::from_millis(799), WINDOW));

        // the dropped attempts did not extend the window
        assert_eq!(
            guard,
            AnimationGuard::Animating {
                started: t0,
                until: t0 + WINDOW
            }
        );
    }

    #[test]
    fn test_timer_returns_to_idle() {
        let t0 = Instant::now();
        let mut guard = AnimationGuard::default();
        guard.try_begin(t0, WINDOW);
        guard.timer_fired();
        assert!(guard.is_idle());
        assert!(guard.try_begin(t0 + Duration::from_millis(10), WINDOW));
    }

    #[test]
    fn test_expired_window_resets() {
        let t0 = Instant::now();
        let mut guard = AnimationGuard::default();
        guard.try_begin(t0, WINDOW);

        assert!(guard.poll(t0 + Duration::from_millis(500)));
        assert!(!guard.poll(t0 + WINDOW));
        assert!(guard.is_idle());
    }

    #[test]
    fn test_elapsed() {
        let t0 = Instant::now();
        let mut guard = AnimationGuard::default();
        assert_eq!(guard.elapsed(t0), None);
        guard.try_begin(t0, WINDOW);
        assert_eq!(guard.elapsed(t0 + Duration::from_millis(300)), Some(Duration::from_millis(300)));
    }
}
