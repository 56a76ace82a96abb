//! ToDo API のターミナル版フロントエンド
//!
//! 起動時にセッションを非同期で読み込みつつ初期画面を描画し、
//! 以降は 1 行 1 コマンドで API を呼び出す。

pub mod app;
pub mod command;
pub mod error;
pub mod views;

pub use app::{App, Flow};
pub use command::Command;
pub use error::ShellError;
