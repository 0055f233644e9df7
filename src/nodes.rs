//! Node Boundary Module
//!
//! ホスト（ノードエディタやCLI）に公開する文字列ベースの操作。
//! ここより外側にはエラーを返さず、すべてログに記録したうえで文字列に変換します。

use tracing::{debug, error};

use crate::builder::SheetsClient;
use crate::error::SheetsError;

impl SheetsClient {
    /// 範囲を読み込み、行ごとの文字列を返す
    ///
    /// エラーの場合はエラーメッセージ1件のみを含むベクタを返します。
    pub fn read_sheet(&mut self, spreadsheet_id: &str, range: &str) -> Vec<String> {
        match self.read(spreadsheet_id, range) {
            Ok(rows) => rows,
            Err(err) => vec![report(&err)],
        }
    }

    /// 値を1件書き込み、確認メッセージまたはエラーメッセージを1件返す
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use gsheetzero::{SheetsClientBuilder, StaticToken};
    ///
    /// # fn main() -> Result<(), gsheetzero::SheetsError> {
    /// let mut client = SheetsClientBuilder::new()
    ///     .with_credentials(StaticToken::new("ya29..."))
    ///     .build()?;
    /// let result = client.write_sheet("spreadsheet-id", "Sheet1!B", "hello");
    /// // ["Data successfully written to Sheet1!B4."]
    /// println!("{}", result[0]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn write_sheet(&mut self, spreadsheet_id: &str, range: &str, payload: &str) -> Vec<String> {
        match self.write(spreadsheet_id, range, payload) {
            Ok(message) => vec![message],
            Err(err) => vec![report(&err)],
        }
    }

    /// 範囲を消去し、確認メッセージまたはエラーメッセージを1件返す
    pub fn clear_range(&mut self, spreadsheet_id: &str, range: &str) -> Vec<String> {
        match self.clear(spreadsheet_id, range) {
            Ok(message) => vec![message],
            Err(err) => vec![report(&err)],
        }
    }
}

/// エラーをログに記録し、呼び出し元に返す文字列に変換する
fn report(err: &SheetsError) -> String {
    let message = err.to_user_message();
    error!("{}", message);
    debug!("Error type: {}", err.kind());
    debug!("Error details: {:?}", err);
    message
}
