//! Sheet Size Module
//!
//! 書き込み前に対象シートの行数・列数を確認し、足りなければ拡張するモジュール。
//! 失敗しても書き込みは中断しません（範囲外書き込みはサービス側の挙動に委ねる）。

use tracing::{debug, info, warn};

use crate::error::SheetsError;
use crate::limiter::RateLimiter;
use crate::transport::{
    AppendDimension, Dimension, DimensionRequest, SheetProperties, SheetsTransport,
};
use crate::types::column_index;

/// シートサイズ確認の結果
#[derive(Debug)]
#[non_exhaustive]
pub enum SizeCheck {
    /// 行・列を追加した
    Resized {
        /// 追加した行数
        rows_added: u32,
        /// 追加した列数
        columns_added: u32,
    },

    /// 現在のサイズで足りている
    NotNeeded,

    /// 確認または拡張に失敗した（書き込みは続行する）
    Failed(SheetsError),
}

impl SizeCheck {
    /// 失敗したかどうか
    pub fn is_failed(&self) -> bool {
        matches!(self, SizeCheck::Failed(_))
    }
}

/// 必要な拡張指示を計算する（0〜2件）
///
/// # 引数
///
/// * `sheet` - 現在のシートプロパティ
/// * `target_column` - 1始まりの列番号
/// * `target_row` - 1始まりの行番号
///
/// # 使用例
///
/// ```rust
/// use gsheetzero::{plan_resize, SheetProperties, GridProperties};
///
/// let sheet = SheetProperties {
///     sheet_id: 0,
///     title: "Sheet1".to_string(),
///     grid_properties: GridProperties { row_count: 100, column_count: 26 },
/// };
/// assert_eq!(plan_resize(&sheet, 1, 150).len(), 1);
/// assert!(plan_resize(&sheet, 1, 100).is_empty());
/// ```
pub fn plan_resize(
    sheet: &SheetProperties,
    target_column: u32,
    target_row: u32,
) -> Vec<DimensionRequest> {
    let grid = sheet.grid_properties;
    let mut requests = Vec::with_capacity(2);

    if target_row > grid.row_count {
        requests.push(DimensionRequest::AppendDimension(AppendDimension {
            sheet_id: sheet.sheet_id,
            dimension: Dimension::Rows,
            length: target_row - grid.row_count,
        }));
    }

    if target_column > grid.column_count {
        requests.push(DimensionRequest::AppendDimension(AppendDimension {
            sheet_id: sheet.sheet_id,
            dimension: Dimension::Columns,
            length: target_column - grid.column_count,
        }));
    }

    requests
}

/// シートが対象セルを収容できることを保証する（ベストエフォート）
///
/// グリッドサイズは毎回取得し直します（他の書き込み元がサイズを変えている可能性があるため）。
pub(crate) fn ensure_sheet_size(
    transport: &dyn SheetsTransport,
    limiter: &mut RateLimiter,
    spreadsheet_id: &str,
    sheet_name: &str,
    target_column: &str,
    target_row: u32,
) -> SizeCheck {
    match try_ensure_sheet_size(
        transport,
        limiter,
        spreadsheet_id,
        sheet_name,
        target_column,
        target_row,
    ) {
        Ok(check) => check,
        Err(err) => {
            warn!("Error while ensuring sheet size: {}", err);
            debug!("Error type: {}", err.kind());
            SizeCheck::Failed(err)
        }
    }
}

fn try_ensure_sheet_size(
    transport: &dyn SheetsTransport,
    limiter: &mut RateLimiter,
    spreadsheet_id: &str,
    sheet_name: &str,
    target_column: &str,
    target_row: u32,
) -> Result<SizeCheck, SheetsError> {
    limiter.acquire();
    let sheets = transport.sheet_properties(spreadsheet_id)?;

    let sheet = sheets
        .iter()
        .find(|s| s.title == sheet_name)
        .ok_or_else(|| SheetsError::SheetNotFound {
            sheet: sheet_name.to_string(),
        })?;

    let column = column_index(target_column)?;
    let requests = plan_resize(sheet, column, target_row);
    if requests.is_empty() {
        return Ok(SizeCheck::NotNeeded);
    }

    let mut rows_added = 0;
    let mut columns_added = 0;
    for DimensionRequest::AppendDimension(append) in &requests {
        match append.dimension {
            Dimension::Rows => rows_added = append.length,
            Dimension::Columns => columns_added = append.length,
        }
    }

    limiter.acquire();
    transport.batch_update(spreadsheet_id, &requests)?;
    info!(
        "Resized sheet '{}': added {} rows and {} columns",
        sheet_name, rows_added, columns_added
    );

    Ok(SizeCheck::Resized {
        rows_added,
        columns_added,
    })
}
