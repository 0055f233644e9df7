//! `reqwest`によるSheets v4 REST APIの実装

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::wire::{BatchUpdateRequest, SpreadsheetMetadata};
use super::{
    ClearValuesResponse, Connector, DimensionRequest, SheetProperties, SheetsTransport,
    UpdateValuesResponse, ValueRange,
};
use crate::credentials::CredentialSource;
use crate::error::SheetsError;

/// ベアラートークンで認証されたHTTPセッション
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    token: String,
}

impl HttpTransport {
    pub fn new(base_url: Url, token: String, timeout: Duration) -> Result<Self, SheetsError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gsheetzero/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// `{base}/v4/spreadsheets/{id}/{tail...}`のURLを組み立てる
    ///
    /// 各セグメントはパーセントエンコードされます（範囲式の空白など）。
    fn spreadsheet_url(&self, spreadsheet_id: &str, tail: &[&str]) -> Result<Url, SheetsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SheetsError::Config(format!("Invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id])
            .extend(tail);
        Ok(url)
    }

    fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SheetsError> {
        let response = request.bearer_auth(&self.token).send()?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SheetsError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text()?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl SheetsTransport for HttpTransport {
    fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange, SheetsError> {
        let url = self.spreadsheet_url(spreadsheet_id, &["values", range])?;
        debug!("GET {}", url);
        self.execute(self.client.get(url))
    }

    fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        body: &ValueRange,
    ) -> Result<UpdateValuesResponse, SheetsError> {
        let mut url = self.spreadsheet_url(spreadsheet_id, &["values", range])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");
        debug!("PUT {}", url);
        self.execute(self.client.put(url).json(body))
    }

    fn clear_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ClearValuesResponse, SheetsError> {
        let segment = format!("{}:clear", range);
        let url = self.spreadsheet_url(spreadsheet_id, &["values", &segment])?;
        debug!("POST {}", url);
        self.execute(self.client.post(url).json(&serde_json::json!({})))
    }

    fn sheet_properties(&self, spreadsheet_id: &str) -> Result<Vec<SheetProperties>, SheetsError> {
        let mut url = self.spreadsheet_url(spreadsheet_id, &[])?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties");
        debug!("GET {}", url);
        let metadata: SpreadsheetMetadata = self.execute(self.client.get(url))?;
        Ok(metadata
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties)
            .collect())
    }

    fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: &[DimensionRequest],
    ) -> Result<(), SheetsError> {
        // `{id}:batchUpdate`は1つのセグメント
        let url = self.spreadsheet_url(&format!("{}:batchUpdate", spreadsheet_id), &[])?;
        debug!("POST {}", url);
        let _: serde_json::Value =
            self.execute(self.client.post(url).json(&BatchUpdateRequest { requests }))?;
        Ok(())
    }
}

/// 認証情報から`HttpTransport`を生成するコネクタ
pub struct HttpConnector {
    credentials: Box<dyn CredentialSource>,
    base_url: Url,
    timeout: Duration,
}

impl HttpConnector {
    pub fn new(credentials: Box<dyn CredentialSource>, base_url: Url, timeout: Duration) -> Self {
        Self {
            credentials,
            base_url,
            timeout,
        }
    }
}

impl std::fmt::Debug for HttpConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConnector")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Connector for HttpConnector {
    fn connect(&self) -> Result<Box<dyn SheetsTransport>, SheetsError> {
        let token = self.credentials.access_token()?;
        let transport = HttpTransport::new(self.base_url.clone(), token, self.timeout)?;
        Ok(Box::new(transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> HttpTransport {
        HttpTransport::new(
            Url::parse("https://sheets.googleapis.com/").unwrap(),
            "s3cr3t".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_values_url_encodes_range() {
        let url = transport()
            .spreadsheet_url("abc123", &["values", "My Sheet!B:B"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/My%20Sheet!B:B"
        );
    }

    #[test]
    fn test_spreadsheet_url_without_tail() {
        let url = transport().spreadsheet_url("abc123", &[]).unwrap();
        assert_eq!(url.as_str(), "https://sheets.googleapis.com/v4/spreadsheets/abc123");
    }

    #[test]
    fn test_batch_update_url() {
        let url = transport().spreadsheet_url("abc123:batchUpdate", &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123:batchUpdate"
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let debug = format!("{:?}", transport());
        assert!(!debug.contains("s3cr3t"));
        assert!(debug.contains("sheets.googleapis.com"));
    }
}
