//! gsheetzero - Rate-limited Google Sheets client with next-row append allocation
//!
//! このクレートは、リモートのスプレッドシートサービス（Google Sheets v4）に対する
//! 読み込み・追記・クリアの3操作を提供します。中心となるのは追記処理で、
//! 対象列の「次の空き行」をキャッシュしながら決定し、1分あたりのリクエスト上限を守り、
//! クォータ超過時には指数バックオフでリトライします。
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gsheetzero::{SheetsClientBuilder, TokenFile};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // トークンファイルから認証情報を読み込むクライアント
//!     let mut client = SheetsClientBuilder::new()
//!         .with_credentials(TokenFile::new("token.json"))
//!         .build()?;
//!
//!     // B列の次の空き行に追記
//!     let message = client.write("spreadsheet-id", "Sheet1!B", "hello")?;
//!     println!("{}", message);
//!
//!     // 行番号を明示して書き込み
//!     client.write("spreadsheet-id", "Sheet1!C5", "=SUM(A1:A4)")?;
//!
//!     // 読み込み（各行はカンマ区切りの文字列）
//!     for row in client.read("spreadsheet-id", "Sheet1!A1:C10")? {
//!         println!("{}", row);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # 文字列ベースの操作
//!
//! ホストに組み込む場合は、エラーを返さずに必ず文字列を返す
//! `read_sheet`・`write_sheet`・`clear_range`を使用します。
//!
//! ```rust,no_run
//! use gsheetzero::{SheetsClientBuilder, StaticToken};
//!
//! # fn main() -> Result<(), gsheetzero::SheetsError> {
//! let mut client = SheetsClientBuilder::new()
//!     .with_credentials(StaticToken::new("ya29..."))
//!     .build()?;
//!
//! let result = client.clear_range("spreadsheet-id", "Sheet1!A2");
//! // ["Successfully cleared range: Sheet1!A2:A1000"]
//! println!("{:?}", result);
//! # Ok(())
//! # }
//! ```
//!
//! # カスタム設定
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use gsheetzero::{RateLimitConfig, RetryConfig, SheetsClientBuilder, TokenFile};
//!
//! # fn main() -> Result<(), gsheetzero::SheetsError> {
//! let client = SheetsClientBuilder::new()
//!     .with_credentials(TokenFile::new("token.json"))
//!     .with_rate_limit(RateLimitConfig {
//!         max_requests_per_window: 30,
//!         ..RateLimitConfig::default()
//!     })
//!     .with_retry(RetryConfig {
//!         max_attempts: 5,
//!         initial_delay: Duration::from_secs(1),
//!         ..RetryConfig::default()
//!     })
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod api;
mod builder;
mod clock;
mod credentials;
mod error;
mod limiter;
mod nodes;
mod row_cache;
mod sizing;
mod transport;
mod types;

// 公開API
pub use api::{RateLimitConfig, RetryConfig};
pub use builder::{SheetsClient, SheetsClientBuilder};
pub use clock::{Clock, ManualClock, SystemClock};
pub use credentials::{CredentialSource, StaticToken, TokenFile};
pub use error::SheetsError;
pub use sizing::{plan_resize, SizeCheck};
pub use transport::{
    AppendDimension, ClearValuesResponse, Connector, Dimension, DimensionRequest, GridProperties,
    HttpConnector, HttpTransport, SheetProperties, SheetsTransport, UpdateValuesResponse,
    ValueRange,
};
pub use types::{column_index, column_label, CellReference, SheetRange};
