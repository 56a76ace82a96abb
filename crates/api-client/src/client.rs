use crate::response::{expect_success, read_json};
use domain::{LoginCredentials, LoginResponse, NewTodo, Registration, Todo, TodoId, TodoPatch, User};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{header, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use shared::{ApiError, ClientConfig, SessionCookie, SESSION_COOKIE_NAME};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// ログイン結果
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub response: LoginResponse,
    /// サーバーが発行したセッション Cookie
    pub session: Option<SessionCookie>,
}

#[derive(Clone)]
pub struct ApiClient {
    config: ClientConfig,
    http: reqwest::Client,
    jar: Arc<Jar>,
    origin: Url,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let origin = Url::parse(&config.api_base)
            .map_err(|e| ApiError::Configuration(format!("invalid API base: {}", e)))?;
        let jar = Arc::new(Jar::default());

        let mut builder = reqwest::Client::builder().cookie_provider(jar.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            config: config.clone(),
            http,
            jar,
            origin,
        })
    }

    /// 既存のセッション資格情報を Cookie Jar に登録する
    pub fn with_session(self, session: &SessionCookie) -> Self {
        self.jar
            .add_cookie_str(&session.set_cookie_value(), &self.origin);
        self
    }

    /// API のオリジンに対して現在保持しているセッション Cookie
    pub fn session(&self) -> Option<SessionCookie> {
        let header = self.jar.cookies(&self.origin)?;
        let header = header.to_str().ok()?;
        SessionCookie::from_cookie_header(header)
    }

    /// GET /todos
    pub async fn fetch_todos(&self) -> Result<Vec<Todo>, ApiError> {
        let response = self.send(self.request(Method::GET, self.url("todos")?)).await?;
        let response = expect_success(response).await?;
        read_json(response).await
    }

    /// POST /todos
    pub async fn create_todo(&self, title: &str) -> Result<Todo, ApiError> {
        let builder = self.json_request(Method::POST, self.url("todos")?, &NewTodo::new(title))?;
        let response = expect_success(self.send(builder).await?).await?;
        let todo: Todo = read_json(response).await?;
        info!(todo_id = %todo.id, "todo created");
        Ok(todo)
    }

    /// PUT /todos/{id}
    ///
    /// パッチは任意の JSON オブジェクトを受け付ける。型付きで送るなら [`TodoPatch`] を使う。
    pub async fn update_todo<P>(&self, id: &TodoId, patch: &P) -> Result<Todo, ApiError>
    where
        P: Serialize + ?Sized,
    {
        let builder = self.json_request(Method::PUT, self.todo_url(id)?, patch)?;
        let response = expect_success(self.send(builder).await?).await?;
        read_json(response).await
    }

    /// 完了状態だけを更新する（`{"done": bool}` を送る）
    pub async fn set_done(&self, id: &TodoId, done: bool) -> Result<Todo, ApiError> {
        self.update_todo(id, &TodoPatch::done(done)).await
    }

    /// DELETE /todos/{id}
    pub async fn delete_todo(&self, id: &TodoId) -> Result<(), ApiError> {
        let response = self
            .send(self.request(Method::DELETE, self.todo_url(id)?))
            .await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(());
        }
        expect_success(response).await?;
        Ok(())
    }

    /// POST /register
    pub async fn register(&self, email: &str, name: &str, password: &str) -> Result<User, ApiError> {
        let body = Registration::new(email, name, password);
        let builder = self.json_request(Method::POST, self.url("register")?, &body)?;
        let response = expect_success(self.send(builder).await?).await?;
        read_json(response).await
    }

    /// POST /login
    ///
    /// 成功するとサーバーがセッション Cookie を設定し、以降の呼び出しに付与される。
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        let body = LoginCredentials::new(email, password);
        let builder = self.json_request(Method::POST, self.url("login")?, &body)?;
        let response = expect_success(self.send(builder).await?).await?;

        let session = response
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE_NAME)
            .map(|c| SessionCookie::new(c.value()));
        if session.is_none() {
            warn!("login succeeded without a session cookie");
        }

        let bytes = response.bytes().await?;
        let parsed = if bytes.is_empty() {
            LoginResponse::default()
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                debug!(error = %e, "login body is not a JSON object");
                LoginResponse::default()
            })
        };

        info!("logged in");
        Ok(LoginOutcome {
            response: parsed,
            session,
        })
    }

    /// POST /logout
    pub async fn logout(&self) -> Result<(), ApiError> {
        let response = self.send(self.request(Method::POST, self.url("logout")?)).await?;
        if response.status() != StatusCode::NO_CONTENT {
            expect_success(response).await?;
        }
        info!("logged out");
        Ok(())
    }

    /// GET /me
    pub async fn fetch_me(&self) -> Result<User, ApiError> {
        let response = self.send(self.request(Method::GET, self.url("me")?)).await?;
        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "identity check failed");
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
            });
        }
        read_json(response).await
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Url::parse(&self.config.endpoint(path))
            .map_err(|e| ApiError::Configuration(format!("invalid endpoint `{}`: {}", path, e)))
    }

    /// `todos/{id}` の URL。識別子は 1 つのパスセグメントとしてエンコードする。
    fn todo_url(&self, id: &TodoId) -> Result<Url, ApiError> {
        let segment = id.to_string();
        if segment == "." || segment == ".." {
            return Err(ApiError::Serialization(format!(
                "todo id cannot be used as a path segment: {}",
                segment
            )));
        }

        let mut url = self.url("todos")?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Configuration("API base cannot be a base URL".to_string()))?
            .push(&segment);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(method = %method, url = %url, "sending request");
        self.http.request(method, url)
    }

    fn json_request<B>(&self, method: Method, url: Url, body: &B) -> Result<RequestBuilder, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(payload))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        builder.send().await.map_err(|e| {
            warn!(error = %e, "transport failure");
            ApiError::from(e)
        })
    }
}
