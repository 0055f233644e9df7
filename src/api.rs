//! Public API Types
//!
//! 公開APIで使用する設定型を定義するモジュール。

use std::time::Duration;

/// リクエストの送信ペース設定
///
/// サービスの公開上限（1分あたり60リクエスト）に対し、余裕を持たせた値を既定とします。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// 1ウィンドウあたりの最大リクエスト数
    ///
    /// デフォルト: 55
    pub max_requests_per_window: u32,

    /// カウンタをリセットするウィンドウ長
    ///
    /// デフォルト: 60秒
    pub window: Duration,

    /// 連続するリクエスト間の最小間隔
    ///
    /// デフォルト: 1.1秒
    pub min_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests_per_window: 55,
            window: Duration::from_secs(60),
            min_interval: Duration::from_millis(1100),
        }
    }
}

/// クォータ超過時のリトライ設定
///
/// 書き込みがHTTP 429で拒否された場合のみ使用されます。
/// 待機時間は`initial_delay`から`backoff_factor`倍ずつ増加し、`max_delay`で頭打ちになります。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// 初回を含む最大試行回数
    ///
    /// デフォルト: 3
    pub max_attempts: u32,

    /// 最初のリトライ前の待機時間
    ///
    /// デフォルト: 2秒
    pub initial_delay: Duration,

    /// 指数バックオフの係数
    ///
    /// デフォルト: 2.0
    pub backoff_factor: f64,

    /// 待機時間の上限
    ///
    /// デフォルト: 30秒
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// 直前の待機時間から次の待機時間を計算
    ///
    /// `Duration`で表せない大きさになった場合は`max_delay`を返します。
    pub(crate) fn next_delay(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff_factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}
