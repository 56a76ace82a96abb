//! 画面のテキスト描画

use domain::{Todo, User};
use router::RouteTable;

pub fn todo_line(todo: &Todo) -> String {
    let mark = if todo.done { "x" } else { " " };
    format!("[{}] {}  {}", mark, todo.id, todo.title)
}

pub fn todo_list(todos: &[Todo]) -> String {
    if todos.is_empty() {
        return "No todos yet. Add one with `add <title>`.".to_string();
    }
    todos.iter().map(todo_line).collect::<Vec<_>>().join("\n")
}

pub fn user_line(user: Option<&User>) -> String {
    match user {
        Some(user) => format!("{} <{}>", user.name, user.email),
        None => "Not logged in.".to_string(),
    }
}

pub fn dashboard(user: Option<&User>) -> String {
    match user {
        Some(user) => format!(
            "Welcome back, {}!\nOpen /todos to see your list.",
            user.name
        ),
        None => "Not logged in. Use `login <email> <password>` or `register <email> <name> <password>`."
            .to_string(),
    }
}

pub fn login_form(user: Option<&User>) -> String {
    match user {
        Some(user) => format!("Already logged in as {}.", user_line(Some(user))),
        None => "Log in with `login <email> <password>`.".to_string(),
    }
}

pub fn register_form() -> String {
    "Create an account with `register <email> <name> <password>`.".to_string()
}

pub fn no_view(path: &str) -> String {
    format!("No view for {}", path)
}

pub fn routes(table: &RouteTable) -> String {
    table
        .routes()
        .iter()
        .map(|route| format!("{:<10} {}", route.path, route.view))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn help() -> String {
    [
        "go <path> | /<path>           open a view",
        "list                          show todos",
        "add <title>                   create a todo",
        "done <id> | undo <id>         mark a todo done or not done",
        "rename <id> <title>           change a todo's title",
        "rm <id>                       delete a todo",
        "login <email> <password>      start a session",
        "register <email> <name> <pw>  create an account",
        "logout                        end the session",
        "whoami                        show the session user",
        "routes                        list known paths",
        "quit                          leave",
    ]
    .join("\n")
}
