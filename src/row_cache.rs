//! Row Cache Module
//!
//! (スプレッドシート, シート, 列) ごとに次の書き込み行を記憶し、
//! 書き込みのたびに列全体を再取得しないようにするモジュール。
//!
//! キャッシュが正しいのは、キャッシュの生存期間中このプロセスが
//! 対象列の唯一の書き込み元である場合に限られます。

use std::collections::HashMap;

use tracing::debug;

use crate::error::SheetsError;
use crate::limiter::RateLimiter;
use crate::transport::SheetsTransport;
use crate::types::RowKey;

/// 次の書き込み行のキャッシュ
#[derive(Debug, Default)]
pub(crate) struct RowCache {
    rows: HashMap<RowKey, u32>,
}

impl RowCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 書き込み先の行を決定する
    ///
    /// # 引数
    ///
    /// * `transport` - キャッシュミス時に列を読み込むセッション
    /// * `limiter` - リモート呼び出し前に通過するレートリミッター
    /// * `key` - キャッシュキー
    /// * `explicit_row` - セル参照に含まれていた行番号
    ///
    /// # 戻り値
    ///
    /// * 行番号が明示されている場合: その行番号（キャッシュもリモートも使用しない）
    /// * キャッシュミス: 列の値の行数 + 1（リモート読み込み1回）
    /// * キャッシュヒット: キャッシュ値を1つ進めた値
    pub fn resolve(
        &mut self,
        transport: &dyn SheetsTransport,
        limiter: &mut RateLimiter,
        key: &RowKey,
        explicit_row: Option<u32>,
    ) -> Result<u32, SheetsError> {
        if let Some(row) = explicit_row {
            return Ok(row);
        }

        if let Some(row) = self.rows.get_mut(key) {
            *row += 1;
            debug!("Row cache hit for {}!{}: next row {}", key.sheet, key.column, row);
            return Ok(*row);
        }

        let column_range = format!("{}!{}:{}", key.sheet, key.column, key.column);
        limiter.acquire();
        let values = transport.get_values(&key.spreadsheet_id, &column_range)?;
        let row = values.values.len() as u32 + 1;

        debug!(
            "Row cache miss for {}: {} populated rows, next row {}",
            column_range,
            values.values.len(),
            row
        );
        self.rows.insert(key.clone(), row);
        Ok(row)
    }

    /// キャッシュされている行番号
    pub fn get(&self, key: &RowKey) -> Option<u32> {
        self.rows.get(key).copied()
    }

    /// すべてのキーを破棄する
    pub fn clear(&mut self) {
        if !self.rows.is_empty() {
            debug!("Clearing row cache ({} entries)", self.rows.len());
        }
        self.rows.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.rows.len()
    }
}
