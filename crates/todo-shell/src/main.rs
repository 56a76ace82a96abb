//! todo-shell バイナリのエントリポイント

use anyhow::Context;
use api_client::ApiClient;
use clap::Parser;
use router::{RouteLayout, RouteTable};
use session::SessionStore;
use shared::{init_tracing, ClientConfig, LogFormat, SessionCookie};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use todo_shell::{App, Command, Flow};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "todo-shell", version, about = "Terminal client for the todo REST API")]
struct Args {
    /// REST API のベース URL
    #[arg(long, env = "TODO_API_BASE")]
    api_base: Option<String>,

    /// ルート表の構成（full / compact）
    #[arg(long = "routes", env = "TODO_ROUTE_LAYOUT")]
    route_layout: Option<String>,

    /// 起動時に開くパス
    #[arg(long, default_value = "/")]
    path: String,

    /// 既存のセッション Cookie の値
    #[arg(long, env = "TODO_SESSION", hide_env_values = true)]
    session: Option<String>,

    #[arg(long, env = "TODO_LOG_FORMAT")]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ClientConfig::from_env().context("failed to load configuration")?;
    if let Some(api_base) = &args.api_base {
        config = config.with_api_base(api_base)?;
    }
    if let Some(layout) = &args.route_layout {
        config.route_layout = layout.clone();
    }
    if let Some(format) = &args.log_format {
        config.log_format = format.parse::<LogFormat>()?;
    }

    init_tracing(config.log_format).map_err(|e| anyhow::anyhow!(e))?;

    let layout: RouteLayout = config.route_layout.parse()?;
    let mut client = ApiClient::new(&config)?;
    if let Some(value) = &args.session {
        client = client.with_session(&SessionCookie::new(value.as_str()));
    }
    info!(api_base = %config.api_base, ?layout, "todo-shell starting");

    // セッションの読み込みは初期描画を待たせない
    let session = SessionStore::new();
    let boot = {
        let session = session.clone();
        let client = client.clone();
        tokio::spawn(async move { session.load_user(&client).await })
    };

    let app = App::new(client, session, RouteTable::for_layout(layout));
    if let Flow::Output(text) = app.run(Command::Go(args.path.clone())).await {
        println!("{}", text);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };
        match app.run_line(&line).await {
            Flow::Output(text) if text.is_empty() => {}
            Flow::Output(text) => println!("{}", text),
            Flow::Quit => break,
        }
    }

    boot.abort();
    info!("todo-shell finished");
    Ok(())
}
