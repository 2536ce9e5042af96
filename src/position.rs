//! Device position sources
//!
//! Live device positions reach the resolver through the injectable
//! [`PositionSource`] seam. [`CachedPositionSource`] adds a request timeout
//! and a short-lived cache on the last successful fix, so repeated lookups
//! within the max-age window do not hit the underlying source again.

use crate::WhereaboutsError;
use crate::cache::{Clock, SystemClock};
use crate::models::Coordinate;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

/// A source of live device positions
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Return the current position, or an error when the position is
    /// unavailable or denied
    async fn current_position(&self) -> crate::Result<Coordinate>;
}

/// Fixed position source, used for request-supplied device coordinates and
/// in tests
pub struct StaticPositionSource {
    position: Option<Coordinate>,
}

impl StaticPositionSource {
    /// Always report the given position
    #[must_use]
    pub fn fixed(position: Coordinate) -> Self {
        Self {
            position: Some(position),
        }
    }

    /// Always report the position as unavailable
    #[must_use]
    pub fn unavailable() -> Self {
        Self { position: None }
    }
}

#[async_trait]
impl PositionSource for StaticPositionSource {
    async fn current_position(&self) -> crate::Result<Coordinate> {
        self.position
            .ok_or_else(|| WhereaboutsError::position("No device position available"))
    }
}

/// Wraps a position source with a request timeout and a max-age cache on the
/// last successful fix
pub struct CachedPositionSource<S> {
    inner: S,
    timeout: Duration,
    max_age: Duration,
    clock: Arc<dyn Clock>,
    last_fix: Mutex<Option<(Coordinate, SystemTime)>>,
}

impl<S: PositionSource> CachedPositionSource<S> {
    #[must_use]
    pub fn new(inner: S, timeout: Duration, max_age: Duration) -> Self {
        Self::with_clock(inner, timeout, max_age, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(
        inner: S,
        timeout: Duration,
        max_age: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner,
            timeout,
            max_age,
            clock,
            last_fix: Mutex::new(None),
        }
    }
}

#[async_trait]
impl<S: PositionSource> PositionSource for CachedPositionSource<S> {
    async fn current_position(&self) -> crate::Result<Coordinate> {
        let now = self.clock.now();

        {
            let last_fix = self.last_fix.lock().expect("position lock poisoned");
            if let Some((fix, at)) = *last_fix {
                let fresh = now
                    .duration_since(at)
                    .map(|age| age < self.max_age)
                    .unwrap_or(false);
                if fresh {
                    tracing::debug!("reusing cached device position");
                    return Ok(fix);
                }
            }
        }

        let fix = tokio::time::timeout(self.timeout, self.inner.current_position())
            .await
            .map_err(|_| {
                WhereaboutsError::position(format!(
                    "Device position request timed out after {}s",
                    self.timeout.as_secs()
                ))
            })??;

        *self.last_fix.lock().expect("position lock poisoned") = Some((fix, now));
        Ok(fix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::UNIX_EPOCH;

    struct CountingSource {
        calls: AtomicU32,
        position: Coordinate,
    }

    #[async_trait]
    impl PositionSource for CountingSource {
        async fn current_position(&self) -> crate::Result<Coordinate> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.position)
        }
    }

    #[tokio::test]
    async fn test_static_source() {
        let coord = Coordinate::new(4.05, 9.7).unwrap();
        let source = StaticPositionSource::fixed(coord);
        assert_eq!(source.current_position().await.unwrap(), coord);

        let source = StaticPositionSource::unavailable();
        assert!(source.current_position().await.is_err());
    }

    #[tokio::test]
    async fn test_cached_source_reuses_recent_fix() {
        let coord = Coordinate::new(4.05, 9.7).unwrap();
        let clock = Arc::new(ManualClock::starting_at(UNIX_EPOCH));
        let source = CachedPositionSource::with_clock(
            CountingSource {
                calls: AtomicU32::new(0),
                position: coord,
            },
            Duration::from_secs(10),
            Duration::from_secs(60),
            Arc::clone(&clock) as Arc<dyn Clock>,
        );

        assert_eq!(source.current_position().await.unwrap(), coord);
        clock.advance(Duration::from_secs(30));
        assert_eq!(source.current_position().await.unwrap(), coord);
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 1);

        // Past the max age the inner source is queried again
        clock.advance(Duration::from_secs(31));
        assert_eq!(source.current_position().await.unwrap(), coord);
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 2);
    }
}
