//! 現在の認証ユーザーを保持するセッションストア
//!
//! グローバル変数ではなく、必要とする側へ明示的に渡すハンドルとして扱う。
//! 値を書き込むのは `load_user` だけで、常に直近で完了した `GET /me` の結果を表す。

use api_client::ApiClient;
use domain::User;
use shared::ApiError;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Clone)]
pub struct SessionStore {
    sender: Arc<watch::Sender<Option<User>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// `GET /me` を呼び、結果でストアを置き換える
    ///
    /// 失敗の種類を問わず「未ログイン」として扱い、エラーは返さない。
    pub async fn load_user(&self, client: &ApiClient) -> Option<User> {
        let user = match client.fetch_me().await {
            Ok(user) => {
                info!(user_id = %user.id, "session loaded");
                Some(user)
            }
            Err(e) => {
                debug!(error = %e, "no active session");
                None
            }
        };
        self.sender.send_replace(user.clone());
        user
    }

    /// 認証エラーを受けたらセッションを再読み込みする
    ///
    /// それ以外のエラーでは何もしない。再読み込みした場合は true。
    pub async fn reconcile(&self, client: &ApiClient, error: &ApiError) -> bool {
        if !error.is_auth_failure() {
            return false;
        }
        debug!(code = error.code(), "auth failure observed, refreshing session");
        self.load_user(client).await;
        true
    }

    pub fn current(&self) -> Option<User> {
        self.sender.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.sender.borrow().is_some()
    }

    /// 値の変化を監視するレシーバー
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.sender.subscribe()
    }
}
