use crate::command::Command;
use crate::error::ShellError;
use crate::views;
use api_client::ApiClient;
use domain::TodoPatch;
use router::{RouteTable, View};
use session::SessionStore;
use tracing::{debug, warn};

/// コマンド実行後の制御
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Output(String),
    Quit,
}

/// アプリケーションの文脈（API クライアント・セッション・ルート表）
#[derive(Clone)]
pub struct App {
    client: ApiClient,
    session: SessionStore,
    routes: RouteTable,
}

impl App {
    pub fn new(client: ApiClient, session: SessionStore, routes: RouteTable) -> Self {
        Self {
            client,
            session,
            routes,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// 入力 1 行を処理する。エラーは表示用の文字列に変換して返す。
    pub async fn run_line(&self, line: &str) -> Flow {
        if line.trim().is_empty() {
            return Flow::Output(String::new());
        }
        match line.parse::<Command>() {
            Ok(command) => self.run(command).await,
            Err(e) => Flow::Output(format!("error: {}", e)),
        }
    }

    pub async fn run(&self, command: Command) -> Flow {
        match self.execute(command).await {
            Ok(flow) => flow,
            Err(ShellError::Api(e)) => {
                warn!(code = e.code(), status = ?e.status(), "command failed");
                let mut message = format!("error: {}", e.user_message());
                let was_authenticated = self.session.is_authenticated();
                if self.session.reconcile(&self.client, &e).await
                    && was_authenticated
                    && !self.session.is_authenticated()
                {
                    message.push_str(" (session ended, please log in again)");
                }
                Flow::Output(message)
            }
            Err(e) => Flow::Output(format!("error: {}", e)),
        }
    }

    pub async fn execute(&self, command: Command) -> Result<Flow, ShellError> {
        debug!(command = command_name(&command), "executing");
        let output = match command {
            Command::Go(path) => self.navigate(&path).await?,
            Command::List => self.show_todos().await?,
            Command::Add(title) => {
                let todo = self.client.create_todo(&title).await?;
                format!("Added {}", views::todo_line(&todo))
            }
            Command::Done(id) => views::todo_line(&self.client.set_done(&id, true).await?),
            Command::Undo(id) => views::todo_line(&self.client.set_done(&id, false).await?),
            Command::Rename(id, title) => {
                let todo = self.client.update_todo(&id, &TodoPatch::title(title)).await?;
                views::todo_line(&todo)
            }
            Command::Remove(id) => {
                self.client.delete_todo(&id).await?;
                format!("Deleted {}", id)
            }
            Command::Login(credentials) => {
                let outcome = self
                    .client
                    .login(&credentials.email, &credentials.password)
                    .await?;
                match self.session.load_user(&self.client).await {
                    Some(user) => format!("Logged in as {}.", views::user_line(Some(&user))),
                    None => match outcome.response.user {
                        Some(user) => format!("Logged in as {}.", views::user_line(Some(&user))),
                        None => "Logged in.".to_string(),
                    },
                }
            }
            Command::Register(registration) => {
                let user = self
                    .client
                    .register(
                        &registration.email,
                        &registration.name,
                        &registration.password,
                    )
                    .await?;
                format!("Registered {}. You can now log in.", user.email)
            }
            Command::Logout => self.logout().await?,
            Command::WhoAmI => {
                let user = self.session.load_user(&self.client).await;
                views::user_line(user.as_ref())
            }
            Command::Routes => views::routes(&self.routes),
            Command::Help => views::help(),
            Command::Quit => return Ok(Flow::Quit),
        };
        Ok(Flow::Output(output))
    }

    /// パスに対応する画面を描画する
    pub async fn navigate(&self, path: &str) -> Result<String, ShellError> {
        let view = match self.routes.resolve(path) {
            Some(view) => view,
            None => return Ok(views::no_view(path)),
        };
        debug!(path = %path, view = %view, "navigating");

        let current = self.session.current();
        let rendered = match view {
            View::Todos => self.show_todos().await?,
            View::Dashboard => views::dashboard(current.as_ref()),
            View::Login => views::login_form(current.as_ref()),
            View::Register => views::register_form(),
            View::Logout => self.logout().await?,
        };
        Ok(rendered)
    }

    async fn show_todos(&self) -> Result<String, ShellError> {
        let todos = self.client.fetch_todos().await?;
        Ok(views::todo_list(&todos))
    }

    async fn logout(&self) -> Result<String, ShellError> {
        self.client.logout().await?;
        self.session.load_user(&self.client).await;
        Ok("Logged out.".to_string())
    }
}

/// ログ用のコマンド名（引数は出さない）
fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Go(_) => "go",
        Command::List => "list",
        Command::Add(_) => "add",
        Command::Done(_) => "done",
        Command::Undo(_) => "undo",
        Command::Rename(..) => "rename",
        Command::Remove(_) => "rm",
        Command::Login(_) => "login",
        Command::Register(_) => "register",
        Command::Logout => "logout",
        Command::WhoAmI => "whoami",
        Command::Routes => "routes",
        Command::Help => "help",
        Command::Quit => "quit",
    }
}
