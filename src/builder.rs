//! Builder Module
//!
//! Fluent Builder APIを提供し、`SheetsClient`インスタンスを段階的に構築する。
//! `SheetsClient`は読み込み・書き込み・クリアの各操作のファサードです。

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::{RateLimitConfig, RetryConfig};
use crate::clock::{Clock, SystemClock};
use crate::credentials::CredentialSource;
use crate::error::SheetsError;
use crate::limiter::RateLimiter;
use crate::row_cache::RowCache;
use crate::sizing::{ensure_sheet_size, SizeCheck};
use crate::transport::{Connector, HttpConnector, SheetsTransport, ValueRange};
use crate::types::{parse_row, CellReference, RowKey, SheetRange};

/// Sheets v4 APIの既定のベースURL
const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/";

/// クリア時に`:`が無い範囲を延長する最終行
const CLEAR_LAST_ROW: u32 = 1000;

/// クライアントの設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ClientConfig {
    /// レート制御
    pub rate_limit: RateLimitConfig,

    /// クォータ超過時のリトライ
    pub retry: RetryConfig,

    /// APIのベースURL
    pub base_url: String,

    /// HTTPリクエストのタイムアウト
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// 認証情報（またはコネクタ）以外の設定項目にはデフォルト値があり、
/// 必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use gsheetzero::{SheetsClientBuilder, TokenFile};
///
/// # fn main() -> Result<(), gsheetzero::SheetsError> {
/// let mut client = SheetsClientBuilder::new()
///     .with_credentials(TokenFile::new("token.json"))
///     .build()?;
/// let message = client.write("spreadsheet-id", "Sheet1!A", "hello")?;
/// println!("{}", message);
/// # Ok(())
/// # }
/// ```
pub struct SheetsClientBuilder {
    /// 内部設定（構築中）
    config: ClientConfig,

    credentials: Option<Box<dyn CredentialSource>>,

    connector: Option<Box<dyn Connector>>,

    clock: Option<Arc<dyn Clock>>,
}

impl Default for SheetsClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetsClientBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - レート制御: 60秒あたり55リクエスト、最小間隔1.1秒
    /// - リトライ: 最大3回試行、2秒から倍々、上限30秒
    /// - ベースURL: `https://sheets.googleapis.com/`
    /// - タイムアウト: 30秒
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            credentials: None,
            connector: None,
            clock: None,
        }
    }

    /// レート制御の設定を指定する
    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.config.rate_limit = rate_limit;
        self
    }

    /// クォータ超過時のリトライ設定を指定する
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// APIのベースURLを指定する（テスト用のモックサーバーなど）
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// HTTPリクエストのタイムアウトを指定する
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// アクセストークンの供給元を指定する
    ///
    /// セッションは最初のリモート呼び出し時に確立されます。
    pub fn with_credentials(mut self, credentials: impl CredentialSource + 'static) -> Self {
        self.credentials = Some(Box::new(credentials));
        self
    }

    /// セッションを確立するコネクタを直接指定する
    ///
    /// 指定した場合、`with_credentials`・`with_base_url`・`with_timeout`より優先されます。
    pub fn with_connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Some(Box::new(connector));
        self
    }

    /// 時刻源を指定する（デフォルトは`SystemClock`）
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// 設定を検証し、`SheetsClient`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `SheetsError::Config(String)`: 設定の検証に失敗した場合
    ///   * レート制御の上限が0、ウィンドウ長が0、最小間隔がウィンドウ長より長い
    ///   * リトライの試行回数が0、係数が1未満、初回待機が上限より長い
    ///   * ベースURLが解析できない
    ///   * 認証情報もコネクタも指定されていない
    pub fn build(self) -> Result<SheetsClient, SheetsError> {
        // 1. レート制御の検証
        let rate_limit = &self.config.rate_limit;
        if rate_limit.max_requests_per_window == 0 {
            return Err(SheetsError::Config(
                "Rate limit must allow at least one request per window".to_string(),
            ));
        }
        if rate_limit.window.is_zero() {
            return Err(SheetsError::Config("Rate limit window must be non-zero".to_string()));
        }
        if rate_limit.min_interval > rate_limit.window {
            return Err(SheetsError::Config(format!(
                "Minimum request interval ({:?}) exceeds the window ({:?})",
                rate_limit.min_interval, rate_limit.window
            )));
        }

        // 2. リトライ設定の検証
        let retry = &self.config.retry;
        if retry.max_attempts == 0 {
            return Err(SheetsError::Config(
                "Retry max_attempts must be at least 1".to_string(),
            ));
        }
        if !(retry.backoff_factor >= 1.0 && retry.backoff_factor.is_finite()) {
            return Err(SheetsError::Config(format!(
                "Retry backoff factor must be a finite value >= 1.0, got {}",
                retry.backoff_factor
            )));
        }
        if retry.initial_delay > retry.max_delay {
            return Err(SheetsError::Config(format!(
                "Initial retry delay ({:?}) exceeds max delay ({:?})",
                retry.initial_delay, retry.max_delay
            )));
        }

        // 3. コネクタの決定
        let connector: Box<dyn Connector> = match (self.connector, self.credentials) {
            (Some(connector), _) => connector,
            (None, Some(credentials)) => {
                let base_url = Url::parse(&self.config.base_url).map_err(|e| {
                    SheetsError::Config(format!(
                        "Invalid base URL '{}': {}",
                        self.config.base_url, e
                    ))
                })?;
                if base_url.cannot_be_a_base() {
                    return Err(SheetsError::Config(format!(
                        "Base URL '{}' cannot carry a path",
                        self.config.base_url
                    )));
                }
                Box::new(HttpConnector::new(credentials, base_url, self.config.timeout))
            }
            (None, None) => {
                return Err(SheetsError::Config(
                    "Either credentials or a connector must be provided".to_string(),
                ))
            }
        };

        // 4. SheetsClientインスタンス生成
        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        Ok(SheetsClient::new(self.config, connector, clock))
    }
}

/// スプレッドシート操作のファサード
///
/// レートリミッター・行キャッシュ・セッションを所有し、読み込み・書き込み・クリアの
/// すべての操作がそれらを共有します。操作は`&mut self`を取るため、
/// 複数スレッドから使う場合は呼び出し側で`Mutex`などに包んでください。
pub struct SheetsClient {
    config: ClientConfig,
    connector: Box<dyn Connector>,
    session: Option<Box<dyn SheetsTransport>>,
    limiter: RateLimiter,
    row_cache: RowCache,
    clock: Arc<dyn Clock>,
}

impl SheetsClient {
    pub(crate) fn new(
        config: ClientConfig,
        connector: Box<dyn Connector>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            limiter: RateLimiter::new(config.rate_limit, clock.clone()),
            row_cache: RowCache::new(),
            session: None,
            connector,
            clock,
            config,
        }
    }

    /// セッションを確立（初回のみ）
    fn ensure_session(&mut self) -> Result<(), SheetsError> {
        if self.session.is_none() {
            debug!("Establishing Sheets session");
            self.session = Some(self.connector.connect()?);
        }
        Ok(())
    }

    /// 範囲の値を読み込み、各行をカンマ区切りの文字列にして返す
    ///
    /// `range`はサービスのネイティブ構文（例: `Sheet1!A1:B10`）です。
    /// データが無い場合は空のベクタを返します。
    pub fn read(&mut self, spreadsheet_id: &str, range: &str) -> Result<Vec<String>, SheetsError> {
        validate_spreadsheet_id(spreadsheet_id)?;
        if range.is_empty() {
            return Err(SheetsError::Usage("Range must not be empty".to_string()));
        }

        self.ensure_session()?;
        let transport = established(&self.session)?;
        self.limiter.acquire();
        let result = transport.get_values(spreadsheet_id, range)?;

        if result.values.is_empty() {
            warn!("No data found in the specified range");
            return Ok(Vec::new());
        }

        info!("Successfully read {} rows of data", result.values.len());
        Ok(result.values.iter().map(|row| join_row(row)).collect())
    }

    /// 対象列の次の空き行（または明示された行）に1つの値を書き込む
    ///
    /// `range`は`Sheet!Column`または`Sheet!Cell`形式（例: `Sheet1!A`、`Sheet1!A5`）です。
    /// クォータ超過（HTTP 429）の場合は行キャッシュを破棄し、指数バックオフで
    /// `RetryConfig::max_attempts`回まで試行します。それ以外のエラーでは
    /// キャッシュを破棄してそのまま返します。
    ///
    /// # 戻り値
    ///
    /// 書き込んだセルを示す確認メッセージ（例: `Data successfully written to Sheet1!B4.`）
    pub fn write(
        &mut self,
        spreadsheet_id: &str,
        range: &str,
        payload: &str,
    ) -> Result<String, SheetsError> {
        // リモート呼び出し前に形式を検証する
        validate_spreadsheet_id(spreadsheet_id)?;
        let target = SheetRange::parse(range)?;
        let cell = CellReference::parse(&target.reference)?;

        let retry = self.config.retry;
        let mut delay = retry.initial_delay;
        let mut attempt = 1;

        loop {
            match self.write_once(spreadsheet_id, &target.sheet, &cell, payload) {
                Ok(message) => return Ok(message),
                Err(err) => {
                    self.row_cache.clear();
                    if err.is_quota() && attempt < retry.max_attempts {
                        warn!(
                            "Quota exceeded, retrying in {:?} ({}/{})",
                            delay,
                            attempt,
                            retry.max_attempts - 1
                        );
                        self.clock.sleep(delay);
                        delay = retry.next_delay(delay);
                        attempt += 1;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }

    fn write_once(
        &mut self,
        spreadsheet_id: &str,
        sheet: &str,
        cell: &CellReference,
        payload: &str,
    ) -> Result<String, SheetsError> {
        self.ensure_session()?;
        let transport = established(&self.session)?;

        let key = RowKey::new(spreadsheet_id, sheet, &cell.column);
        let row = self
            .row_cache
            .resolve(transport, &mut self.limiter, &key, cell.row)?;

        let check = ensure_sheet_size(
            transport,
            &mut self.limiter,
            spreadsheet_id,
            sheet,
            &cell.column,
            row,
        );
        if let SizeCheck::Failed(err) = &check {
            debug!("Proceeding with write despite size check failure: {}", err);
        }

        let target = format!("{}!{}{}", sheet, cell.column, row);
        self.limiter.acquire();
        let response = transport.update_values(
            spreadsheet_id,
            &target,
            &ValueRange::single_cell(&target, payload),
        )?;

        info!(
            "Data written to sheet. Updated {} cell.",
            response.updated_cells.unwrap_or(0)
        );
        Ok(format!("Data successfully written to {}.", target))
    }

    /// 対象セルを収容できるようにシートを拡張する
    ///
    /// `range`は行番号を含む`Sheet!Cell`形式です（例: `Sheet1!C150`）。
    /// 形式の誤りとセッション確立の失敗は`Err`、サイズ確認・拡張の失敗は
    /// `SizeCheck::Failed`として返します。
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use gsheetzero::{SheetsClientBuilder, SizeCheck, StaticToken};
    ///
    /// # fn main() -> Result<(), gsheetzero::SheetsError> {
    /// let mut client = SheetsClientBuilder::new()
    ///     .with_credentials(StaticToken::new("ya29..."))
    ///     .build()?;
    /// if let SizeCheck::Resized { rows_added, .. } =
    ///     client.ensure_sheet_size("spreadsheet-id", "Sheet1!A5000")?
    /// {
    ///     println!("added {} rows", rows_added);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn ensure_sheet_size(
        &mut self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<SizeCheck, SheetsError> {
        validate_spreadsheet_id(spreadsheet_id)?;
        let target = SheetRange::parse(range)?;
        let cell = CellReference::parse(&target.reference)?;
        let row = cell.row.ok_or_else(|| {
            SheetsError::Usage(format!("Cell reference '{}' has no row number", target.reference))
        })?;

        self.ensure_session()?;
        let transport = established(&self.session)?;
        Ok(ensure_sheet_size(
            transport,
            &mut self.limiter,
            spreadsheet_id,
            &target.sheet,
            &cell.column,
            row,
        ))
    }

    /// 範囲の値を消去する
    ///
    /// `range`は`Sheet!Range`形式です。`:`を含まない場合は同じ列の1000行目まで延長します
    /// （`Sheet1!A2` → `Sheet1!A2:A1000`）。成功・失敗にかかわらず行キャッシュは破棄されます。
    pub fn clear(&mut self, spreadsheet_id: &str, range: &str) -> Result<String, SheetsError> {
        validate_spreadsheet_id(spreadsheet_id)?;
        let full_range = expand_clear_range(range)?;

        let result = self.clear_once(spreadsheet_id, &full_range);
        self.row_cache.clear();
        result
    }

    fn clear_once(&mut self, spreadsheet_id: &str, full_range: &str) -> Result<String, SheetsError> {
        self.ensure_session()?;
        let transport = established(&self.session)?;
        self.limiter.acquire();
        let response = transport.clear_values(spreadsheet_id, full_range)?;

        let cleared = response
            .cleared_range
            .unwrap_or_else(|| full_range.to_string());
        info!("Cleared range: {}", cleared);
        Ok(format!("Successfully cleared range: {}", cleared))
    }

    /// 行キャッシュに記録されている行番号（テスト・診断用）
    pub fn cached_row(&self, spreadsheet_id: &str, sheet: &str, column: &str) -> Option<u32> {
        self.row_cache.get(&RowKey::new(spreadsheet_id, sheet, column))
    }

    /// 行キャッシュを破棄する（外部で列が変更された場合など）
    pub fn invalidate_row_cache(&mut self) {
        self.row_cache.clear();
    }
}

impl std::fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsClient")
            .field("config", &self.config)
            .field("connected", &self.session.is_some())
            .field("limiter", &self.limiter)
            .field("row_cache", &self.row_cache)
            .finish()
    }
}

/// 確立済みのセッションを借用する
///
/// フィールド単位で借用するため、レートリミッターや行キャッシュと同時に使える。
fn established(
    session: &Option<Box<dyn SheetsTransport>>,
) -> Result<&dyn SheetsTransport, SheetsError> {
    session
        .as_deref()
        .ok_or_else(|| SheetsError::Transport("Session not established".to_string()))
}

fn validate_spreadsheet_id(spreadsheet_id: &str) -> Result<(), SheetsError> {
    if spreadsheet_id.trim().is_empty() {
        return Err(SheetsError::Usage("Spreadsheet id must not be empty".to_string()));
    }
    Ok(())
}

/// クリア対象の範囲を確定する
///
/// * `:`を含む範囲はそのまま
/// * 行のみの参照は行範囲に延長（`5` → `5:1000`）
/// * セル・列参照は同じ列で延長（`A2` → `A2:A1000`、`B` → `B:B1000`）
///
/// 開始行が1000行目より後の場合、終端は開始行と同じ行になります（範囲を反転させない）。
fn expand_clear_range(range: &str) -> Result<String, SheetsError> {
    let parsed = SheetRange::parse(range)?;
    if parsed.reference.contains(':') {
        return Ok(range.to_string());
    }

    if parsed.reference.bytes().all(|b| b.is_ascii_digit()) {
        let row = parse_row(&parsed.reference, &parsed.reference)?;
        return Ok(format!(
            "{}!{}:{}",
            parsed.sheet,
            row,
            row.max(CLEAR_LAST_ROW)
        ));
    }

    let cell = CellReference::parse(&parsed.reference)?;
    let last_row = cell.row.map_or(CLEAR_LAST_ROW, |row| row.max(CLEAR_LAST_ROW));
    Ok(format!(
        "{}!{}:{}{}",
        parsed.sheet,
        cell.to_a1_notation(),
        cell.column,
        last_row
    ))
}

/// 1行分のセル値をカンマで連結する
fn join_row(row: &[Value]) -> String {
    row.iter()
        .map(|value| match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}
