//! Rate Limiter Module
//!
//! すべてのリモート呼び出しの直前に呼ばれ、1分あたりのリクエスト数と
//! リクエスト間隔を制御する協調的なペース制御を提供します。
//! セマフォではなく、呼び出しスレッドをブロックして待機します。

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::api::RateLimitConfig;
use crate::clock::Clock;

/// リクエスト送信ペースの制御
///
/// 状態は最後のリクエスト時刻と現在のウィンドウ内のリクエスト数のみです。
/// 最後のリクエストからウィンドウ長以上経過するとカウンタは0に戻ります。
pub(crate) struct RateLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    last_request: Option<Duration>,
    requests_in_window: u32,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            last_request: None,
            requests_in_window: 0,
        }
    }

    /// リクエストを1件送信してよくなるまで待機し、送信を記録する
    ///
    /// # 戻り値
    ///
    /// 待機した合計時間（待機不要の場合は`Duration::ZERO`）
    pub fn acquire(&mut self) -> Duration {
        let now = self.clock.now();
        let elapsed = self.last_request.map(|last| now.saturating_sub(last));

        let window_expired = match elapsed {
            None => true,
            Some(elapsed) => elapsed >= self.config.window,
        };
        if window_expired {
            self.requests_in_window = 0;
        }

        let mut waited = Duration::ZERO;
        let since_last = elapsed.unwrap_or(self.config.window);

        if self.requests_in_window >= self.config.max_requests_per_window {
            // ウィンドウが終わるまで待てば最小間隔も満たされる
            let remaining = self.config.window.saturating_sub(since_last);
            debug!(
                "Request quota of {} reached, waiting {:?} for the window to elapse",
                self.config.max_requests_per_window, remaining
            );
            self.clock.sleep(remaining);
            self.requests_in_window = 0;
            waited += remaining;
        } else if since_last < self.config.min_interval {
            let remaining = self.config.min_interval - since_last;
            self.clock.sleep(remaining);
            waited += remaining;
        }

        self.last_request = Some(self.clock.now());
        self.requests_in_window += 1;
        waited
    }

    /// 現在のウィンドウで記録されたリクエスト数
    #[cfg(test)]
    pub fn requests_in_window(&self) -> u32 {
        self.requests_in_window
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("last_request", &self.last_request)
            .field("requests_in_window", &self.requests_in_window)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn limiter() -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let limiter = RateLimiter::new(RateLimitConfig::default(), clock.clone());
        (limiter, clock)
    }

    #[test]
    fn test_first_acquire_does_not_wait() {
        let (mut limiter, clock) = limiter();
        assert_eq!(limiter.acquire(), Duration::ZERO);
        assert_eq!(limiter.requests_in_window(), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn test_min_interval_between_requests() {
        let (mut limiter, clock) = limiter();
        limiter.acquire();
        clock.advance(Duration::from_millis(300));

        let waited = limiter.acquire();
        assert_eq!(waited, Duration::from_millis(800));
        assert_eq!(clock.now(), Duration::from_millis(1100));
    }

    #[test]
    fn test_no_wait_when_interval_already_elapsed() {
        let (mut limiter, clock) = limiter();
        limiter.acquire();
        clock.advance(Duration::from_secs(2));

        assert_eq!(limiter.acquire(), Duration::ZERO);
    }

    #[test]
    fn test_56th_request_waits_for_window() {
        let (mut limiter, clock) = limiter();

        for _ in 0..55 {
            limiter.acquire();
        }
        assert_eq!(limiter.requests_in_window(), 55);
        // 54回の最小間隔待機
        assert_eq!(clock.now(), Duration::from_millis(54 * 1100));

        let waited = limiter.acquire();
        assert_eq!(waited, Duration::from_secs(60));
        assert_eq!(limiter.requests_in_window(), 1);
        assert_eq!(clock.now(), Duration::from_millis(54 * 1100 + 60_000));
    }

    #[test]
    fn test_counter_resets_after_idle_window() {
        let (mut limiter, clock) = limiter();
        for _ in 0..10 {
            limiter.acquire();
        }
        clock.advance(Duration::from_secs(60));

        assert_eq!(limiter.acquire(), Duration::ZERO);
        assert_eq!(limiter.requests_in_window(), 1);
    }

    #[test]
    fn test_quota_wait_accounts_for_elapsed_time() {
        let clock = Arc::new(ManualClock::new());
        let config = RateLimitConfig {
            max_requests_per_window: 2,
            window: Duration::from_secs(10),
            min_interval: Duration::ZERO,
        };
        let mut limiter = RateLimiter::new(config, clock.clone());

        limiter.acquire();
        limiter.acquire();
        clock.advance(Duration::from_secs(4));

        assert_eq!(limiter.acquire(), Duration::from_secs(6));
    }
}
