use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 画面の識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Dashboard,
    Login,
    Logout,
    Register,
    Todos,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Dashboard => "dashboard",
            View::Login => "login",
            View::Logout => "logout",
            View::Register => "register",
            View::Todos => "todos",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("Unknown route layout: {0}")]
    UnknownLayout(String),
}

/// ルート表の構成
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RouteLayout {
    /// ダッシュボードをホームにした 5 パス構成
    Full,
    /// ログインをホームにした 3 パス構成
    #[default]
    Compact,
}

impl FromStr for RouteLayout {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(RouteLayout::Full),
            "compact" => Ok(RouteLayout::Compact),
            other => Err(RouterError::UnknownLayout(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub view: View,
}

/// パス文字列から画面への静的な対応表
///
/// 完全一致のみで、先に登録されたものが優先される。パラメータやリダイレクトは持たない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn for_layout(layout: RouteLayout) -> Self {
        match layout {
            RouteLayout::Full => Self::full(),
            RouteLayout::Compact => Self::compact(),
        }
    }

    pub fn full() -> Self {
        Self::new(vec![
            Route { path: "/login", view: View::Login },
            Route { path: "/logout", view: View::Logout },
            Route { path: "/todos", view: View::Todos },
            Route { path: "/register", view: View::Register },
            Route { path: "/", view: View::Dashboard },
        ])
    }

    pub fn compact() -> Self {
        Self::new(vec![
            Route { path: "/", view: View::Login },
            Route { path: "/register", view: View::Register },
            Route { path: "/todos", view: View::Todos },
        ])
    }

    pub fn resolve(&self, path: &str) -> Option<View> {
        self.routes
            .iter()
            .find(|route| route.path == path)
            .map(|route| route.view)
    }

    pub fn home(&self) -> Option<View> {
        self.resolve("/")
    }

    pub fn paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.routes.iter().map(|route| route.path)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
