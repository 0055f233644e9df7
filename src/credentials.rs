//! Credentials Module
//!
//! セッション確立時に使用するアクセストークンの供給元。
//! OAuthフローそのものは扱わず、取得済みのトークンを受け取ります。

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::error::SheetsError;

/// アクセストークンの供給元
pub trait CredentialSource: Send {
    fn access_token(&self) -> Result<String, SheetsError>;
}

/// 直接渡されたベアラートークン
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(..)")
    }
}

impl CredentialSource for StaticToken {
    fn access_token(&self) -> Result<String, SheetsError> {
        if self.0.is_empty() {
            return Err(SheetsError::Credentials("Access token is empty".to_string()));
        }
        Ok(self.0.clone())
    }
}

/// JSONファイルに保存されたトークン
///
/// ファイル形式:
///
/// ```json
/// {"access_token": "ya29...", "expiry": "2026-10-16T12:00:00Z"}
/// ```
///
/// `expiry`は省略可能です。現在時刻以前の場合はエラーになります。
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

#[derive(Deserialize)]
struct StoredToken {
    access_token: String,
    #[serde(default)]
    expiry: Option<DateTime<Utc>>,
}

impl TokenFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn load(&self) -> Result<StoredToken, SheetsError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            SheetsError::Credentials(format!(
                "Failed to read token file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            SheetsError::Credentials(format!(
                "Token file {} is not in the expected format: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl CredentialSource for TokenFile {
    fn access_token(&self) -> Result<String, SheetsError> {
        info!("Getting credentials for Google Sheets");
        let token = self.load().inspect_err(|e| error!("{}", e))?;

        if let Some(expiry) = token.expiry {
            debug!("Token expiry: {}", expiry);
            if expiry <= Utc::now() {
                let err = SheetsError::Credentials(format!("Access token expired at {}", expiry));
                error!("{}", err);
                return Err(err);
            }
        }

        if token.access_token.is_empty() {
            return Err(SheetsError::Credentials(
                "Token file contains an empty access token".to_string(),
            ));
        }

        info!("Google Sheets credentials obtained successfully");
        Ok(token.access_token)
    }
}
