use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use domain::{
    LoginCredentials, NewTodo, Registration, Todo, TodoId, TodoPatch, User, UserId,
};
use serde_json::Value;
use shared::{ClientConfig, SessionCookie, SESSION_COOKIE_NAME};
use std::{
    collections::{BTreeMap, HashMap},
    net::SocketAddr,
    sync::{Arc, Mutex},
};
use tokio::task::JoinHandle;

/// 受信したリクエストの記録（テスト観測用）
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub session: Option<String>,
    pub body: Option<Value>,
}

/// 偽バックエンドの共有状態
#[derive(Clone, Default)]
pub struct FakeState {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    users: Vec<StoredUser>,
    sessions: HashMap<String, UserId>,
    todos: BTreeMap<i64, Todo>,
    next_todo_id: i64,
    next_user_id: i64,
    injected: Option<(StatusCode, String)>,
    requests: Vec<RecordedRequest>,
}

struct StoredUser {
    user: User,
    password: String,
}

impl FakeState {
    /// 次の 1 リクエストを指定ステータスで失敗させる
    pub fn fail_next(&self, status: u16, body: &str) {
        let status = StatusCode::from_u16(status).unwrap();
        self.inner.lock().unwrap().injected = Some((status, body.to_string()));
    }

    pub fn add_user(&self, email: &str, name: &str, password: &str) -> User {
        let mut inner = self.inner.lock().unwrap();
        inner.next_user_id += 1;
        let user = User {
            id: UserId::from(inner.next_user_id),
            email: email.to_lowercase(),
            name: name.to_string(),
        };
        inner.users.push(StoredUser {
            user: user.clone(),
            password: password.to_string(),
        });
        user
    }

    pub fn add_todo(&self, title: &str, done: bool) -> Todo {
        let mut inner = self.inner.lock().unwrap();
        inner.next_todo_id += 1;
        let id = inner.next_todo_id;
        let todo = Todo {
            id: TodoId::from(id),
            title: title.to_string(),
            done,
        };
        inner.todos.insert(id, todo.clone());
        todo
    }

    /// ログイン済みセッションを直接発行する
    pub fn open_session(&self, user: &User) -> SessionCookie {
        let sid = uuid::Uuid::new_v4().to_string();
        self.inner
            .lock()
            .unwrap()
            .sessions
            .insert(sid.clone(), user.id.clone());
        SessionCookie::new(sid)
    }

    pub fn todos(&self) -> Vec<Todo> {
        self.inner.lock().unwrap().todos.values().cloned().collect()
    }

    pub fn session_count(&self) -> usize {
        self.inner.lock().unwrap().sessions.len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.inner.lock().unwrap().requests.last().cloned()
    }

    /// リクエストを記録し、注入された失敗があればそれを返す
    fn begin(
        &self,
        method: &str,
        path: &str,
        headers: &HeaderMap,
        body: &Bytes,
    ) -> Result<Option<User>, Response> {
        let session = headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(SessionCookie::from_cookie_header);

        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(RecordedRequest {
            method: method.to_string(),
            path: path.to_string(),
            session: session.as_ref().map(|s| s.value().to_string()),
            body: serde_json::from_slice(body).ok(),
        });

        if let Some((status, text)) = inner.injected.take() {
            return Err((status, text).into_response());
        }

        let user = session
            .and_then(|s| inner.sessions.get(s.value()).cloned())
            .and_then(|id| {
                inner
                    .users
                    .iter()
                    .find(|u| u.user.id == id)
                    .map(|u| u.user.clone())
            });
        Ok(user)
    }
}

/// 起動済みの偽バックエンド（drop で停止）
pub struct FakeBackend {
    pub state: FakeState,
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl FakeBackend {
    pub async fn spawn() -> Self {
        let state = FakeState::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fake backend");
        let addr = listener.local_addr().expect("fake backend has no address");

        let app = router(state.clone());
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "fake backend stopped");
            }
        });

        Self {
            state,
            addr,
            handle,
        }
    }

    pub fn api_base(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&self.api_base()).expect("fake backend URL is valid")
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn router(state: FakeState) -> Router {
    let api = Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/:id", put(update_todo).delete(delete_todo))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me));

    Router::new().nest("/api", api).with_state(state)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "unauthorized\n").into_response()
}

async fn list_todos(State(state): State<FakeState>, headers: HeaderMap) -> Response {
    match state.begin("GET", "/todos", &headers, &Bytes::new()) {
        Err(resp) => resp,
        Ok(None) => unauthorized(),
        Ok(Some(_)) => (StatusCode::OK, Json(state.todos())).into_response(),
    }
}

async fn create_todo(State(state): State<FakeState>, headers: HeaderMap, body: Bytes) -> Response {
    match state.begin("POST", "/todos", &headers, &body) {
        Err(resp) => return resp,
        Ok(None) => return unauthorized(),
        Ok(Some(_)) => {}
    }

    let input: NewTodo = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => return (StatusCode::BAD_REQUEST, format!("invalid JSON: {}\n", e)).into_response(),
    };
    if input.title.is_empty() {
        return (StatusCode::BAD_REQUEST, "title required\n").into_response();
    }

    let todo = state.add_todo(&input.title, false);
    (StatusCode::CREATED, Json(todo)).into_response()
}

async fn update_todo(
    State(state): State<FakeState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = format!("/todos/{}", id);
    match state.begin("PUT", &path, &headers, &body) {
        Err(resp) => return resp,
        Ok(None) => return unauthorized(),
        Ok(Some(_)) => {}
    }

    let patch: TodoPatch = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => return (StatusCode::BAD_REQUEST, format!("invalid JSON: {}\n", e)).into_response(),
    };

    let not_found = || (StatusCode::NOT_FOUND, "not found\n").into_response();
    let key = match id.parse::<i64>() {
        Ok(n) => n,
        Err(_) => return not_found(),
    };

    let mut inner = state.inner.lock().unwrap();
    match inner.todos.get_mut(&key) {
        Some(todo) => {
            todo.apply(&patch);
            (StatusCode::OK, Json(todo.clone())).into_response()
        }
        None => not_found(),
    }
}

async fn delete_todo(
    State(state): State<FakeState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let path = format!("/todos/{}", id);
    match state.begin("DELETE", &path, &headers, &Bytes::new()) {
        Err(resp) => return resp,
        Ok(None) => return unauthorized(),
        Ok(Some(_)) => {}
    }

    if let Ok(n) = id.parse::<i64>() {
        state.inner.lock().unwrap().todos.remove(&n);
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn register(State(state): State<FakeState>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(resp) = state.begin("POST", "/register", &headers, &body) {
        return resp;
    }

    let input: Registration = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid JSON\n").into_response(),
    };
    if input.email.is_empty() || input.name.is_empty() || input.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "email, name and password required\n",
        )
            .into_response();
    }

    let exists = {
        let inner = state.inner.lock().unwrap();
        let email = input.email.to_lowercase();
        inner.users.iter().any(|u| u.user.email == email)
    };
    if exists {
        return (StatusCode::CONFLICT, "email already registered\n").into_response();
    }

    let user = state.add_user(&input.email, &input.name, &input.password);
    (StatusCode::CREATED, Json(user)).into_response()
}

async fn login(State(state): State<FakeState>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(resp) = state.begin("POST", "/login", &headers, &body) {
        return resp;
    }

    let input: LoginCredentials = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid JSON\n").into_response(),
    };

    let user = {
        let inner = state.inner.lock().unwrap();
        let email = input.email.to_lowercase();
        inner
            .users
            .iter()
            .find(|u| u.user.email == email && u.password == input.password)
            .map(|u| u.user.clone())
    };
    let user = match user {
        Some(u) => u,
        None => return (StatusCode::UNAUTHORIZED, "invalid credentials\n").into_response(),
    };

    let session = state.open_session(&user);
    let body = serde_json::json!({ "status": "ok", "user": user });
    (
        StatusCode::OK,
        [(header::SET_COOKIE, session.set_cookie_value())],
        Json(body),
    )
        .into_response()
}

async fn logout(State(state): State<FakeState>, headers: HeaderMap) -> Response {
    if let Err(resp) = state.begin("POST", "/logout", &headers, &Bytes::new()) {
        return resp;
    }

    let session = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(SessionCookie::from_cookie_header);
    if let Some(session) = session {
        state.inner.lock().unwrap().sessions.remove(session.value());
    }

    let cleared = format!("{}=; Path=/; Max-Age=0; HttpOnly", SESSION_COOKIE_NAME);
    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, cleared)]).into_response()
}

async fn me(State(state): State<FakeState>, headers: HeaderMap) -> Response {
    match state.begin("GET", "/me", &headers, &Bytes::new()) {
        Err(resp) => resp,
        Ok(None) => unauthorized(),
        Ok(Some(user)) => (StatusCode::OK, Json(user)).into_response(),
    }
}
