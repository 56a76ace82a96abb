use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// サーバーが払い出す不透明な識別子
///
/// サーバーは整数を返すが、クライアントは受け取った JSON スカラーを
/// そのままの形で保持し、同じ形で送り返す。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Number(i64),
    Text(String),
}

impl ResourceId {
    /// ユーザー入力から識別子を解釈する（整数なら Number、それ以外は Text）
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed.parse::<i64>() {
            Ok(n) => ResourceId::Number(n),
            Err(_) => ResourceId::Text(trimmed.to_string()),
        })
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Number(n) => write!(f, "{}", n),
            ResourceId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(value: i64) -> Self {
        ResourceId::Number(value)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        ResourceId::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub ResourceId);

impl TodoId {
    pub fn new(id: impl Into<ResourceId>) -> Self {
        Self(id.into())
    }
}

impl FromStr for TodoId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceId::parse(s)
            .map(Self)
            .ok_or_else(|| DomainError::InvalidTodoId(s.to_string()))
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TodoId {
    fn from(value: i64) -> Self {
        Self(ResourceId::Number(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub ResourceId);

impl UserId {
    pub fn new(id: impl Into<ResourceId>) -> Self {
        Self(id.into())
    }
}

impl FromStr for UserId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceId::parse(s)
            .map(Self)
            .ok_or_else(|| DomainError::InvalidUserId(s.to_string()))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(ResourceId::Number(value))
    }
}
