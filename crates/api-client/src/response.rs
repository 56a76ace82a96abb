use reqwest::Response;
use serde::de::DeserializeOwned;
use shared::ApiError;
use tracing::{debug, warn};

/// 2xx 以外のレスポンスを RequestFailed に変換する
pub(crate) async fn expect_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            debug!(error = %e, "failed to read error body");
            String::new()
        }
    };
    warn!(status = status.as_u16(), "API request failed");
    Err(ApiError::request_failed(status.as_u16(), &body))
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ApiError::from)
}
