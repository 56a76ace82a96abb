use thiserror::Error;

/// API クライアント全体で使用されるエラー型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    // HTTP レスポンスが非成功ステータスだった
    #[error("Request failed with status {status}{}", describe(.message))]
    RequestFailed {
        status: u16,
        message: Option<String>,
    },

    // 本人確認（GET /me）の失敗
    #[error("Unauthorized (status {status})")]
    Unauthorized { status: u16 },

    // トランスポート層のエラー
    #[error("Network error: {0}")]
    Network(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

fn describe(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {}", m),
        None => String::new(),
    }
}

/// エラーの分類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    /// クライアントエラー（4xx相当）
    Client,
    /// サーバーエラー（5xx相当）
    Server,
    /// 一時的なエラー
    Transient,
    /// 永続的なエラー
    Permanent,
}

impl ApiError {
    /// レスポンスボディのテキストからメッセージ付きの RequestFailed を作成
    pub fn request_failed(status: u16, body: &str) -> Self {
        let trimmed = body.trim();
        ApiError::RequestFailed {
            status,
            message: if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            },
        }
    }

    /// HTTP ステータスを持つエラーならそれを返す
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status, .. } | ApiError::Unauthorized { status } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// エラーコードを取得
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::RequestFailed { .. } => "REQUEST_FAILED",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::Network(_) => "NETWORK_ERROR",
            ApiError::Deserialization(_) => "DESERIALIZATION_ERROR",
            ApiError::Serialization(_) => "SERIALIZATION_ERROR",
            ApiError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiError::RequestFailed { status, .. } if *status >= 500 => ErrorCategory::Server,
            ApiError::RequestFailed { .. } | ApiError::Unauthorized { .. } => {
                ErrorCategory::Client
            }
            ApiError::Network(_) => ErrorCategory::Transient,
            ApiError::Deserialization(_) => ErrorCategory::Server,
            ApiError::Serialization(_) | ApiError::Configuration(_) => ErrorCategory::Permanent,
        }
    }

    /// セッションが無効になったことを示すエラーか
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthorized { .. } | ApiError::RequestFailed { status: 401, .. }
        )
    }

    /// ユーザー向けメッセージを取得
    pub fn user_message(&self) -> String {
        match self {
            ApiError::RequestFailed {
                message: Some(m), ..
            } => m.clone(),
            ApiError::RequestFailed { status: 401, .. } | ApiError::Unauthorized { .. } => {
                "Not logged in".to_string()
            }
            ApiError::RequestFailed { status: 404, .. } => "Not found".to_string(),
            ApiError::RequestFailed { status, .. } => format!("Server responded with {}", status),
            ApiError::Network(_) => "Could not reach the server".to_string(),
            _ => "Unexpected error".to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Deserialization(e.to_string())
        } else if e.is_builder() {
            ApiError::Configuration(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Deserialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_message_from_body() {
        assert_eq!(
            ApiError::request_failed(409, "email already registered\n"),
            ApiError::RequestFailed {
                status: 409,
                message: Some("email already registered".to_string()),
            }
        );
        assert_eq!(
            ApiError::request_failed(500, "  "),
            ApiError::RequestFailed {
                status: 500,
                message: None,
            }
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ApiError::request_failed(404, "not found").to_string(),
            "Request failed with status 404: not found"
        );
        assert_eq!(
            ApiError::request_failed(500, "").to_string(),
            "Request failed with status 500"
        );
        assert_eq!(
            ApiError::Unauthorized { status: 401 }.to_string(),
            "Unauthorized (status 401)"
        );
    }

    #[test]
    fn test_status_and_category() {
        assert_eq!(ApiError::request_failed(503, "").status(), Some(503));
        assert_eq!(ApiError::Unauthorized { status: 403 }.status(), Some(403));
        assert_eq!(ApiError::Network("refused".into()).status(), None);

        assert_eq!(
            ApiError::request_failed(502, "").category(),
            ErrorCategory::Server
        );
        assert_eq!(
            ApiError::request_failed(400, "").category(),
            ErrorCategory::Client
        );
        assert_eq!(
            ApiError::Network("x".into()).category(),
            ErrorCategory::Transient
        );
        assert_eq!(ApiError::Network("x".into()).code(), "NETWORK_ERROR");
    }

    #[test]
    fn test_auth_failure_detection() {
        assert!(ApiError::Unauthorized { status: 401 }.is_auth_failure());
        assert!(ApiError::Unauthorized { status: 500 }.is_auth_failure());
        assert!(ApiError::request_failed(401, "unauthorized").is_auth_failure());
        assert!(!ApiError::request_failed(404, "").is_auth_failure());
        assert!(!ApiError::Network("x".into()).is_auth_failure());
    }

    #[test]
    fn test_user_message() {
        assert_eq!(
            ApiError::request_failed(401, "invalid credentials").user_message(),
            "invalid credentials"
        );
        assert_eq!(
            ApiError::Unauthorized { status: 401 }.user_message(),
            "Not logged in"
        );
        assert_eq!(
            ApiError::request_failed(500, "").user_message(),
            "Server responded with 500"
        );
    }
}
