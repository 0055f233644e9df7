//! テスト用のフェイクSheetsサービス
//!
//! 呼び出しを記録し、列ごとの入力済み行数とシートのグリッドサイズを保持します。
//! 書き込みが成功すると対象列の入力済み行数が更新されるため、
//! キャッシュ破棄後の再取得でも実サービスと同じ行番号が得られます。

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use gsheetzero::{
    AppendDimension, ClearValuesResponse, Clock, Connector, Dimension, DimensionRequest,
    GridProperties, ManualClock, RateLimitConfig, SheetProperties, SheetsClient,
    SheetsClientBuilder, SheetsError, SheetsTransport, UpdateValuesResponse, ValueRange,
};
use serde_json::Value;

/// フェイクに対して行われた呼び出し
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetValues(String),
    Update { range: String, payload: String },
    Clear(String),
    SheetProperties,
    BatchUpdate(Vec<DimensionRequest>),
}

impl Call {
    pub fn is_remote_read_of(&self, range: &str) -> bool {
        matches!(self, Call::GetValues(r) if r == range)
    }
}

pub struct FakeState {
    clock: Arc<ManualClock>,
    /// "Sheet1!B:B" のような列範囲 -> 入力済み行数
    pub columns: HashMap<String, usize>,
    /// 任意範囲の読み込み結果
    pub ranges: HashMap<String, Vec<Vec<Value>>>,
    pub sheets: Vec<SheetProperties>,
    /// 呼び出し時刻と呼び出し内容
    pub calls: Vec<(Duration, Call)>,
    /// 次のupdate呼び出しで返すエラー（先頭から順に消費）
    pub update_failures: VecDeque<SheetsError>,
    /// 次のsheet_properties呼び出しで返すエラー
    pub metadata_failures: VecDeque<SheetsError>,
    /// 次のconnect呼び出しで返すエラー
    pub connect_failures: VecDeque<SheetsError>,
    pub connects: usize,
}

/// フェイクサービスのハンドル（クライアントと状態を共有する）
#[derive(Clone)]
pub struct FakeSheets {
    state: Arc<Mutex<FakeState>>,
    pub clock: Arc<ManualClock>,
}

impl FakeSheets {
    /// "Sheet1"（1000行 × 26列）を1枚持つスプレッドシート
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new());
        let state = FakeState {
            clock: clock.clone(),
            columns: HashMap::new(),
            ranges: HashMap::new(),
            sheets: vec![sheet(0, "Sheet1", 1000, 26)],
            calls: Vec::new(),
            update_failures: VecDeque::new(),
            metadata_failures: VecDeque::new(),
            connect_failures: VecDeque::new(),
            connects: 0,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            clock,
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// 列の入力済み行数を設定
    pub fn with_column(self, sheet: &str, column: &str, populated: usize) -> Self {
        self.state()
            .columns
            .insert(column_key(sheet, column), populated);
        self
    }

    pub fn with_sheets(self, sheets: Vec<SheetProperties>) -> Self {
        self.state().sheets = sheets;
        self
    }

    pub fn with_range(self, range: &str, rows: Vec<Vec<Value>>) -> Self {
        self.state().ranges.insert(range.to_string(), rows);
        self
    }

    pub fn fail_next_update(&self, err: SheetsError) {
        self.state().update_failures.push_back(err);
    }

    pub fn fail_next_metadata(&self, err: SheetsError) {
        self.state().metadata_failures.push_back(err);
    }

    pub fn fail_next_connect(&self, err: SheetsError) {
        self.state().connect_failures.push_back(err);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn call_times(&self) -> Vec<Duration> {
        self.state().calls.iter().map(|(t, _)| *t).collect()
    }

    pub fn connects(&self) -> usize {
        self.state().connects
    }

    pub fn populated(&self, sheet: &str, column: &str) -> usize {
        self.state()
            .columns
            .get(&column_key(sheet, column))
            .copied()
            .unwrap_or(0)
    }

    pub fn connector(&self) -> FakeConnector {
        FakeConnector {
            state: self.state.clone(),
        }
    }

    /// 最小間隔0のレート制御でクライアントを構築（待機はリトライとクォータのみ）
    pub fn client(&self) -> SheetsClient {
        self.client_with(RateLimitConfig {
            min_interval: Duration::ZERO,
            ..RateLimitConfig::default()
        })
    }

    pub fn client_with(&self, rate_limit: RateLimitConfig) -> SheetsClient {
        SheetsClientBuilder::new()
            .with_connector(self.connector())
            .with_clock(self.clock.clone())
            .with_rate_limit(rate_limit)
            .build()
            .unwrap()
    }
}

/// 列範囲のキー（サービスと同じく列ラベルの大文字・小文字を区別しない）
fn column_key(sheet: &str, column: &str) -> String {
    let column = column.to_ascii_uppercase();
    format!("{}!{}:{}", sheet, column, column)
}

/// "Sheet1!b:b" -> "Sheet1!B:B"
fn normalize_range(range: &str) -> String {
    match range.split_once('!') {
        Some((sheet, cells)) => format!("{}!{}", sheet, cells.to_ascii_uppercase()),
        None => range.to_string(),
    }
}

pub fn sheet(id: i64, title: &str, rows: u32, cols: u32) -> SheetProperties {
    SheetProperties {
        sheet_id: id,
        title: title.to_string(),
        grid_properties: GridProperties {
            row_count: rows,
            column_count: cols,
        },
    }
}

pub fn append(sheet_id: i64, dimension: Dimension, length: u32) -> DimensionRequest {
    DimensionRequest::AppendDimension(AppendDimension {
        sheet_id,
        dimension,
        length,
    })
}

pub fn quota_error() -> SheetsError {
    SheetsError::Remote {
        status: 429,
        body: "Quota exceeded for quota metric 'Write requests'".to_string(),
    }
}

pub struct FakeConnector {
    state: Arc<Mutex<FakeState>>,
}

impl Connector for FakeConnector {
    fn connect(&self) -> Result<Box<dyn SheetsTransport>, SheetsError> {
        let mut state = self.state.lock().unwrap();
        state.connects += 1;
        if let Some(err) = state.connect_failures.pop_front() {
            return Err(err);
        }
        Ok(Box::new(FakeTransport {
            state: self.state.clone(),
        }))
    }
}

struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTransport {
    fn record(&self, call: Call) -> MutexGuard<'_, FakeState> {
        let mut state = self.state.lock().unwrap();
        let now = state.clock.now();
        state.calls.push((now, call));
        state
    }
}

impl SheetsTransport for FakeTransport {
    fn get_values(&self, _spreadsheet_id: &str, range: &str) -> Result<ValueRange, SheetsError> {
        let state = self.record(Call::GetValues(range.to_string()));

        let values = if let Some(count) = state.columns.get(&normalize_range(range)) {
            vec![vec![Value::String("filled".to_string())]; *count]
        } else {
            state.ranges.get(range).cloned().unwrap_or_default()
        };

        Ok(ValueRange {
            range: Some(range.to_string()),
            major_dimension: Some("ROWS".to_string()),
            values,
        })
    }

    fn update_values(
        &self,
        _spreadsheet_id: &str,
        range: &str,
        body: &ValueRange,
    ) -> Result<UpdateValuesResponse, SheetsError> {
        let payload = body
            .values
            .first()
            .and_then(|row| row.first())
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let mut state = self.record(Call::Update {
            range: range.to_string(),
            payload,
        });

        if let Some(err) = state.update_failures.pop_front() {
            return Err(err);
        }

        // "Sheet1!B4" -> 列"Sheet1!B:B"の入力済み行数を4以上に
        if let Some((sheet, cell)) = range.split_once('!') {
            let column: String = cell.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
            let row: usize = cell[column.len()..].parse().unwrap_or(0);
            let entry = state.columns.entry(column_key(sheet, &column)).or_insert(0);
            *entry = (*entry).max(row);
        }

        Ok(UpdateValuesResponse {
            updated_range: Some(range.to_string()),
            updated_rows: Some(1),
            updated_cells: Some(1),
        })
    }

    fn clear_values(
        &self,
        _spreadsheet_id: &str,
        range: &str,
    ) -> Result<ClearValuesResponse, SheetsError> {
        let mut state = self.record(Call::Clear(range.to_string()));

        // 対象シートの列をすべて空にする（フェイクでは範囲の厳密な判定は行わない）
        if let Some((sheet, _)) = range.split_once('!') {
            let prefix = format!("{}!", sheet);
            state.columns.retain(|key, _| !key.starts_with(&prefix));
        }

        Ok(ClearValuesResponse {
            cleared_range: Some(range.to_string()),
        })
    }

    fn sheet_properties(&self, _spreadsheet_id: &str) -> Result<Vec<SheetProperties>, SheetsError> {
        let mut state = self.record(Call::SheetProperties);
        if let Some(err) = state.metadata_failures.pop_front() {
            return Err(err);
        }
        Ok(state.sheets.clone())
    }

    fn batch_update(
        &self,
        _spreadsheet_id: &str,
        requests: &[DimensionRequest],
    ) -> Result<(), SheetsError> {
        let mut state = self.record(Call::BatchUpdate(requests.to_vec()));

        for DimensionRequest::AppendDimension(append) in requests {
            if let Some(sheet) = state
                .sheets
                .iter_mut()
                .find(|s| s.sheet_id == append.sheet_id)
            {
                match append.dimension {
                    Dimension::Rows => sheet.grid_properties.row_count += append.length,
                    Dimension::Columns => sheet.grid_properties.column_count += append.length,
                }
            }
        }
        Ok(())
    }
}
