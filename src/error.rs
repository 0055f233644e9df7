//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// gsheetzeroクレート全体で使用するエラー型
///
/// 範囲式の解析、シートサイズの確認、リモート呼び出しなど、
/// 読み込み・書き込み・クリア処理中に発生するすべてのエラーを統一的に扱います。
///
/// # エラーの種類
///
/// - `Usage`: 範囲式やセル参照の形式が不正（リモート呼び出し前に検出）
/// - `SheetNotFound`: 指定されたシート名がスプレッドシートに存在しない
/// - `Remote`: サービスがリクエストを拒否した（ステータス429はクォータ超過）
/// - `Transport` / `Decode` / `Io`: 通信・応答解析・I/Oの失敗
/// - `Credentials`: アクセストークンを取得できない
/// - `Config`: ビルダー設定の検証に失敗
///
/// # 使用例
///
/// ```rust
/// use gsheetzero::SheetsError;
///
/// let error = SheetsError::Remote { status: 429, body: "Quota exceeded".to_string() };
/// assert!(error.is_quota());
/// ```
#[derive(Error, Debug)]
pub enum SheetsError {
    /// 範囲式やセル参照の形式が不正
    ///
    /// `Sheet!Ref`区切りが無い、列ラベルが空、行番号が0などの場合に発生します。
    #[error("Usage error: {0}")]
    Usage(String),

    /// シートが見つからない
    ///
    /// シートサイズの確認時に、指定された名前のシートが存在しない場合に発生します。
    #[error("Sheet '{sheet}' not found in spreadsheet")]
    SheetNotFound {
        /// 検索したシート名
        sheet: String,
    },

    /// サービスがリクエストを拒否した
    ///
    /// 2xx以外のHTTPステータスを受け取った場合に使用されます。
    /// ステータス429はクォータ超過として区別されます（[`SheetsError::is_quota`]）。
    #[error("An HTTP error occurred: {status} {body}")]
    Remote {
        /// HTTPステータスコード
        status: u16,
        /// 応答ボディ（サービスのエラー詳細）
        body: String,
    },

    /// リクエストを完了できなかった（接続失敗、タイムアウトなど）
    ///
    /// `#[from]`ではなく`From`実装で`reqwest::Error`から変換されます。
    #[error("Transport error: {0}")]
    Transport(String),

    /// 応答ボディが期待した形式ではない
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// アクセストークンを取得できない
    ///
    /// トークンファイルが存在しない、形式が不正、有効期限切れなどの場合に発生します。
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// 設定の検証に失敗したエラー
    ///
    /// `SheetsClientBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。
    ///
    /// # 例
    ///
    /// ```rust
    /// use gsheetzero::{RetryConfig, SheetsClientBuilder, SheetsError, StaticToken};
    ///
    /// let result = SheetsClientBuilder::new()
    ///     .with_credentials(StaticToken::new("token"))
    ///     .with_retry(RetryConfig { max_attempts: 0, ..RetryConfig::default() })
    ///     .build();
    ///
    /// assert!(matches!(result, Err(SheetsError::Config(_))));
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O操作中に発生したエラー
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SheetsError {
    /// クォータ超過（HTTP 429）かどうか
    pub fn is_quota(&self) -> bool {
        matches!(self, SheetsError::Remote { status: 429, .. })
    }

    /// エラーのカテゴリ名（デバッグログ用）
    pub fn kind(&self) -> &'static str {
        match self {
            SheetsError::Usage(_) => "usage",
            SheetsError::SheetNotFound { .. } => "lookup",
            SheetsError::Remote { status: 429, .. } => "quota",
            SheetsError::Remote { .. } => "remote",
            SheetsError::Transport(_) => "transport",
            SheetsError::Decode(_) => "decode",
            SheetsError::Credentials(_) => "credentials",
            SheetsError::Config(_) => "config",
            SheetsError::Io(_) => "io",
        }
    }

    /// 呼び出し元に返す文字列へ変換
    ///
    /// リモートエラーはステータスとボディをそのまま、それ以外は
    /// `An error occurred: ...`の形式で表現します。
    pub fn to_user_message(&self) -> String {
        match self {
            SheetsError::Remote { .. } => self.to_string(),
            other => format!("An error occurred: {}", other),
        }
    }
}

impl From<reqwest::Error> for SheetsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SheetsError::Decode(err.to_string())
        } else {
            SheetsError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SheetsError {
    fn from(err: serde_json::Error) -> Self {
        SheetsError::Decode(err.to_string())
    }
}
