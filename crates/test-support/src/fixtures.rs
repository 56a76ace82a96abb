use crate::fake_backend::FakeBackend;
use domain::User;
use shared::{ClientConfig, SessionCookie};

pub const ALICE_EMAIL: &str = "alice@example.com";
pub const ALICE_NAME: &str = "Alice";
pub const ALICE_PASSWORD: &str = "correct horse";

/// 登録済みユーザー Alice を追加する
pub fn seed_alice(backend: &FakeBackend) -> User {
    backend.state.add_user(ALICE_EMAIL, ALICE_NAME, ALICE_PASSWORD)
}

/// Alice を追加し、ログイン済みセッションを発行する
pub fn seed_logged_in_alice(backend: &FakeBackend) -> (User, SessionCookie) {
    let user = seed_alice(backend);
    let session = backend.state.open_session(&user);
    (user, session)
}

/// 接続を受け付けないアドレスを指す設定
pub async fn unreachable_config() -> ClientConfig {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind probe listener");
    let addr = listener.local_addr().expect("probe listener has no address");
    drop(listener);
    ClientConfig::new(&format!("http://{}/api", addr)).expect("probe URL is valid")
}
