//! テスト用の支援クレート
//!
//! REST API と同じ契約を持つ axum 製の偽バックエンドをプロセス内で起動する。

pub mod fake_backend;
pub mod fixtures;

pub use fake_backend::{FakeBackend, FakeState, RecordedRequest};
pub use fixtures::*;
