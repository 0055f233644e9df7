//! Sheets v4 REST APIのリクエスト・レスポンス型

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 値の範囲（`spreadsheets.values`のリソース）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,

    /// 行ごとのセル値（末尾の空行・空セルはサービス側で省略される）
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    /// 単一セルに文字列を1つだけ置く値範囲
    pub fn single_cell(range: &str, payload: &str) -> Self {
        Self {
            range: Some(range.to_string()),
            major_dimension: Some("ROWS".to_string()),
            values: vec![vec![Value::String(payload.to_string())]],
        }
    }
}

/// `values.update`の応答
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(default)]
    pub updated_range: Option<String>,

    #[serde(default)]
    pub updated_rows: Option<u32>,

    #[serde(default)]
    pub updated_cells: Option<u32>,
}

/// `values.clear`の応答
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearValuesResponse {
    #[serde(default)]
    pub cleared_range: Option<String>,
}

/// `spreadsheets.get?fields=sheets.properties`の応答
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SpreadsheetMetadata {
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SheetEntry {
    pub properties: SheetProperties,
}

/// シートのプロパティ（ID、名前、グリッドサイズ）
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default)]
    pub sheet_id: i64,

    pub title: String,

    #[serde(default)]
    pub grid_properties: GridProperties,
}

/// グリッドの行数・列数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
    #[serde(default)]
    pub row_count: u32,

    #[serde(default)]
    pub column_count: u32,
}

/// 拡張する次元
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    Rows,
    Columns,
}

/// 行・列を末尾に追加する指示
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendDimension {
    pub sheet_id: i64,
    pub dimension: Dimension,
    pub length: u32,
}

/// `batchUpdate`に含める1件の指示
///
/// シリアライズ結果は`{"appendDimension": {...}}`の形になります。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DimensionRequest {
    AppendDimension(AppendDimension),
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchUpdateRequest<'a> {
    pub requests: &'a [DimensionRequest],
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_range_deserialize_without_values() {
        let range: ValueRange =
            serde_json::from_value(json!({"range": "Sheet1!B1:B1000", "majorDimension": "ROWS"}))
                .unwrap();
        assert!(range.values.is_empty());
        assert_eq!(range.range.as_deref(), Some("Sheet1!B1:B1000"));
    }

    #[test]
    fn test_single_cell_serialization() {
        let body = serde_json::to_value(ValueRange::single_cell("Sheet1!B4", "hello")).unwrap();
        assert_eq!(
            body,
            json!({"range": "Sheet1!B4", "majorDimension": "ROWS", "values": [["hello"]]})
        );
    }

    #[test]
    fn test_dimension_request_serialization() {
        let request = DimensionRequest::AppendDimension(AppendDimension {
            sheet_id: 7,
            dimension: Dimension::Rows,
            length: 50,
        });
        let body = serde_json::to_value(BatchUpdateRequest {
            requests: &[request],
        })
        .unwrap();

        assert_eq!(
            body,
            json!({"requests": [{"appendDimension": {"sheetId": 7, "dimension": "ROWS", "length": 50}}]})
        );
    }

    #[test]
    fn test_spreadsheet_metadata_deserialize() {
        let metadata: SpreadsheetMetadata = serde_json::from_value(json!({
            "sheets": [
                {"properties": {"sheetId": 0, "title": "Sheet1",
                    "gridProperties": {"rowCount": 1000, "columnCount": 26}}},
                {"properties": {"sheetId": 42, "title": "Log"}}
            ]
        }))
        .unwrap();

        assert_eq!(metadata.sheets.len(), 2);
        assert_eq!(metadata.sheets[0].properties.grid_properties.row_count, 1000);
        assert_eq!(metadata.sheets[1].properties.sheet_id, 42);
        assert_eq!(
            metadata.sheets[1].properties.grid_properties,
            GridProperties::default()
        );
    }

    #[test]
    fn test_update_response_deserialize() {
        let response: UpdateValuesResponse = serde_json::from_value(json!({
            "spreadsheetId": "abc",
            "updatedRange": "Sheet1!B4",
            "updatedRows": 1,
            "updatedColumns": 1,
            "updatedCells": 1
        }))
        .unwrap();
        assert_eq!(response.updated_cells, Some(1));
    }
}
