//! Clock Module
//!
//! レートリミッターとリトライ待機が使用する時刻源。
//! テストでは`ManualClock`を使用し、実際にスレッドを停止せずに時間を進めます。

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// 時刻源と待機処理の抽象化
pub trait Clock: Send + Sync {
    /// 任意の起点からの経過時間
    fn now(&self) -> Duration;

    /// 呼び出しスレッドを指定時間停止する
    fn sleep(&self, duration: Duration);
}

/// 実時間の時計（`Instant`と`std::thread::sleep`）
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// 手動で進める時計
///
/// `sleep`は待機せず、仮想時刻を進めて待機時間を記録します。
///
/// # 使用例
///
/// ```rust
/// use std::time::Duration;
/// use gsheetzero::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// clock.sleep(Duration::from_secs(2));
/// assert_eq!(clock.now(), Duration::from_secs(2));
/// assert_eq!(clock.sleeps(), vec![Duration::from_secs(2)]);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    state: Mutex<ManualState>,
}

#[derive(Debug, Default)]
struct ManualState {
    now: Duration,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 待機せずに時刻を進める（外部で時間が経過したことを表す）
    pub fn advance(&self, duration: Duration) {
        let mut state = self.lock();
        state.now += duration;
    }

    /// これまでに`sleep`で要求された待機時間の一覧
    pub fn sleeps(&self) -> Vec<Duration> {
        self.lock().sleeps.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        // 保持中にパニックする処理は無いため、毒化しても状態はそのまま使える
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.lock().now
    }

    fn sleep(&self, duration: Duration) {
        let mut state = self.lock();
        state.now += duration;
        state.sleeps.push(duration);
    }
}
