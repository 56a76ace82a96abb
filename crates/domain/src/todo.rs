use crate::identifiers::TodoId;
use serde::{Deserialize, Serialize};

/// ToDo 項目（ID はサーバー側で採番される）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub done: bool,
}

impl Todo {
    /// パッチを適用する（指定されたフィールドのみ上書き）
    pub fn apply(&mut self, patch: &TodoPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(done) = patch.done {
            self.done = done;
        }
    }
}

/// POST /todos のリクエストボディ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    pub title: String,
}

impl NewTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

/// PUT /todos/{id} の部分更新
///
/// 未指定のフィールドは JSON に含めない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

impl TodoPatch {
    pub fn done(done: bool) -> Self {
        Self {
            done: Some(done),
            ..Self::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}
