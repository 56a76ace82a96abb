//! ToDo REST API のクライアント
//!
//! すべての呼び出しは同じ Cookie Jar を共有する `reqwest::Client` を通るため、
//! ログイン後のセッション Cookie は以降のリクエストに自動で付与される。

pub mod client;
mod response;

pub use client::{ApiClient, LoginOutcome};
