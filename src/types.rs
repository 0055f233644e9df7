//! Types Module
//!
//! 範囲式・セル参照・列番号など、クレート全体で使用する共通データ型を定義するモジュール。

use crate::error::SheetsError;

/// 範囲式の区切り文字（`Sheet1!A5`の`!`）
pub(crate) const RANGE_SEPARATOR: char = '!';

/// `Sheet!Ref`形式の範囲式
///
/// 区切り文字`!`をちょうど1つ含む必要があります。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    /// シート名
    pub sheet: String,

    /// `!`以降の参照部分（`A`、`A5`、`A2:B`など）
    pub reference: String,
}

impl SheetRange {
    /// 範囲式を分割する
    ///
    /// # 戻り値
    ///
    /// * `Ok(SheetRange)` - 区切り文字がちょうど1つあり、両側が空でない場合
    /// * `Err(SheetsError::Usage)` - それ以外
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use gsheetzero::SheetRange;
    ///
    /// let range = SheetRange::parse("Sheet1!B").unwrap();
    /// assert_eq!(range.sheet, "Sheet1");
    /// assert_eq!(range.reference, "B");
    /// assert!(SheetRange::parse("Sheet1B").is_err());
    /// ```
    pub fn parse(expr: &str) -> Result<Self, SheetsError> {
        let separators = expr.matches(RANGE_SEPARATOR).count();
        if separators != 1 {
            return Err(SheetsError::Usage(format!(
                "Range must be in format 'Sheet!Range' (e.g. 'Sheet1!A' or 'Sheet1!A5'), got '{}'",
                expr
            )));
        }

        let (sheet, reference) = expr
            .split_once(RANGE_SEPARATOR)
            .ok_or_else(|| SheetsError::Usage(format!("Missing '!' in range '{}'", expr)))?;

        if sheet.is_empty() || reference.is_empty() {
            return Err(SheetsError::Usage(format!(
                "Sheet name and reference must both be present in '{}'",
                expr
            )));
        }

        Ok(Self {
            sheet: sheet.to_string(),
            reference: reference.to_string(),
        })
    }
}

/// 列ラベルと任意の行番号に分解されたセル参照
///
/// 行番号は1始まりです。`None`の場合、書き込み時に次の空き行が解決されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellReference {
    /// 列ラベル（例: "A", "BC"）
    pub column: String,

    /// 行番号（1始まり、指定がない場合は`None`）
    pub row: Option<u32>,
}

impl CellReference {
    /// セル参照文字列を分解する
    ///
    /// 先頭のアルファベット列を列ラベル、末尾の数字列を行番号として取り出します。
    /// 文字と数字の順序は検証しません。列ラベルは大文字に正規化されます
    /// （サービスは列ラベルの大文字・小文字を区別しないため）。
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use gsheetzero::CellReference;
    ///
    /// let cell = CellReference::parse("BC12").unwrap();
    /// assert_eq!(cell.column, "BC");
    /// assert_eq!(cell.row, Some(12));
    ///
    /// let column_only = CellReference::parse("D").unwrap();
    /// assert_eq!(column_only.row, None);
    /// ```
    pub fn parse(reference: &str) -> Result<Self, SheetsError> {
        let column: String = reference
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if column.is_empty() {
            return Err(SheetsError::Usage(format!(
                "Cell reference '{}' has no column letters",
                reference
            )));
        }

        let digits_start = reference
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map(|(i, _)| i);

        let row = match digits_start {
            None => None,
            Some(start) => Some(parse_row(&reference[start..], reference)?),
        };

        Ok(Self { column, row })
    }

    /// A1形式の文字列に変換（行番号がある場合のみ行を付与）
    pub fn to_a1_notation(&self) -> String {
        match self.row {
            Some(row) => format!("{}{}", self.column, row),
            None => self.column.clone(),
        }
    }
}

/// 列ラベルを1始まりの列番号に変換（"A" -> 1, "Z" -> 26, "AA" -> 27）
///
/// 全単射26進数として扱い、大文字・小文字を区別しません。
///
/// # 使用例
///
/// ```rust
/// use gsheetzero::column_index;
///
/// assert_eq!(column_index("A").unwrap(), 1);
/// assert_eq!(column_index("zz").unwrap(), 702);
/// ```
pub fn column_index(label: &str) -> Result<u32, SheetsError> {
    if label.is_empty() {
        return Err(SheetsError::Usage("Column label must not be empty".to_string()));
    }

    label.chars().try_fold(0u32, |acc, ch| {
        if !ch.is_ascii_alphabetic() {
            return Err(SheetsError::Usage(format!(
                "Column label '{}' contains non-letter '{}'",
                label, ch
            )));
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A' + 1) as u32;
        acc.checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| SheetsError::Usage(format!("Column label '{}' is too long", label)))
    })
}

/// 1始まりの列番号を列ラベルに変換（1 -> "A", 26 -> "Z", 27 -> "AA"）
///
/// 0を渡した場合は空文字列を返します。
pub fn column_label(mut index: u32) -> String {
    let mut result = String::new();
    while index > 0 {
        let remainder = (index - 1) % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        index = (index - 1) / 26;
    }
    result
}

/// 1始まりの行番号を解析する（`reference`はエラーメッセージ用）
pub(crate) fn parse_row(digits: &str, reference: &str) -> Result<u32, SheetsError> {
    let row: u32 = digits
        .parse()
        .map_err(|_| SheetsError::Usage(format!("Row number '{}' is out of range", digits)))?;
    if row == 0 {
        return Err(SheetsError::Usage(format!(
            "Row numbers start at 1, got '{}'",
            reference
        )));
    }
    Ok(row)
}

/// 行キャッシュのキー（スプレッドシートID、シート名、列ラベル）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct RowKey {
    pub spreadsheet_id: String,
    pub sheet: String,
    pub column: String,
}

impl RowKey {
    /// 新しいキーを生成
    pub fn new(spreadsheet_id: &str, sheet: &str, column: &str) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.to_string(),
            sheet: sheet.to_string(),
            column: column.to_ascii_uppercase(),
        }
    }
}
