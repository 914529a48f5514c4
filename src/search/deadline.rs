//! Time budget for one top-level search

use std::time::{Duration, Instant};

/// A start instant plus an optional budget.
///
/// Copied into the search and checked once per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    start: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    /// Expires `budget` from now. A zero budget is already expired.
    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget: Some(budget),
        }
    }

    /// Shorthand for [`Deadline::after`] in milliseconds.
    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        Self::after(Duration::from_millis(ms))
    }

    /// Never expires; depth is then bounded by the search config only.
    #[must_use]
    pub fn never() -> Self {
        Self {
            start: Instant::now(),
            budget: None,
        }
    }

    #[inline]
    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.budget.is_some_and(|b| self.start.elapsed() >= b)
    }

    /// Time left, `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.budget.map(|b| b.saturating_sub(self.start.elapsed()))
    }

    /// Share of the budget used so far: 0.0 when unbounded, 1.0 or more once expired.
    pub fn fraction_spent(&self) -> f64 {
        match self.budget {
            None => 0.0,
            Some(b) if b.is_zero() => 1.0,
            Some(b) => self.start.elapsed().as_secs_f64() / b.as_secs_f64(),
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::never()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_budget_is_expired() {
        let deadline = Deadline::after(Duration::ZERO);
        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Some(Duration::ZERO));
        assert!(deadline.fraction_spent() >= 1.0);
    }

    #[test]
    fn test_never() {
        let deadline = Deadline::never();
        assert!(!deadline.is_expired());
        assert_eq!(deadline.remaining(), None);
        assert_eq!(deadline.fraction_spent(), 0.0);
    }

    #[test]
    fn test_long_budget() {
        let deadline = Deadline::from_millis(60_000);
        assert!(!deadline.is_expired());
        assert!(deadline.fraction_spent() < 0.5);
        assert_eq!(deadline.budget(), Some(Duration::from_secs(60)));
    }
}
