//! Transport Module
//!
//! リモートのスプレッドシートサービスとの通信を抽象化するモジュール。
//! 書き込み・読み込み・クリアの各処理はこのトレイト経由でのみサービスに触れます。

mod http;
mod wire;

use crate::error::SheetsError;

pub use http::{HttpConnector, HttpTransport};
pub use wire::{
    AppendDimension, ClearValuesResponse, Dimension, DimensionRequest, GridProperties,
    SheetProperties, UpdateValuesResponse, ValueRange,
};

/// スプレッドシートサービスへのブロッキング呼び出し
///
/// 各メソッドはリクエストを1件だけ送信します。レート制御は呼び出し側
/// （`SheetsClient`）が各呼び出しの直前に行います。
pub trait SheetsTransport: Send {
    /// 範囲の値を取得する
    fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange, SheetsError>;

    /// 範囲に値を書き込む（ユーザー入力として解釈させる）
    fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        body: &ValueRange,
    ) -> Result<UpdateValuesResponse, SheetsError>;

    /// 範囲の値を消去する
    fn clear_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ClearValuesResponse, SheetsError>;

    /// 全シートのプロパティを取得する
    fn sheet_properties(&self, spreadsheet_id: &str) -> Result<Vec<SheetProperties>, SheetsError>;

    /// 複数の指示を1回のバッチ更新で適用する
    fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: &[DimensionRequest],
    ) -> Result<(), SheetsError>;
}

/// 初回のリモート呼び出し時にセッションを確立する
///
/// 確立したセッションは`SheetsClient`が保持し、以降の呼び出しで再利用されます。
pub trait Connector: Send {
    fn connect(&self) -> Result<Box<dyn SheetsTransport>, SheetsError>;
}
