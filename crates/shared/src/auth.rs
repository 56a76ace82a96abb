use std::fmt;

/// サーバーがログイン時に発行するセッション Cookie 名
pub const SESSION_COOKIE_NAME: &str = "session_id";

/// セッション資格情報
///
/// 通常は Cookie Jar が自動で付与するが、明示的に受け渡しできるよう値として公開する。
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie(String);

impl SessionCookie {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    /// Cookie Jar に登録するための `Set-Cookie` 表現
    pub fn set_cookie_value(&self) -> String {
        format!("{}={}; Path=/; HttpOnly", SESSION_COOKIE_NAME, self.0)
    }

    /// `Cookie` ヘッダーからセッション Cookie を取り出す
    pub fn from_cookie_header(header: &str) -> Option<Self> {
        header.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            if name == SESSION_COOKIE_NAME && !value.is_empty() {
                Some(Self::new(value))
            } else {
                None
            }
        })
    }
}

impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionCookie").field(&"***").finish()
    }
}
