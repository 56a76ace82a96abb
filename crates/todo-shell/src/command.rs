use crate::error::ShellError;
use domain::{LoginCredentials, Registration, TodoId};
use std::str::FromStr;

/// シェルの 1 行コマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Go(String),
    List,
    Add(String),
    Done(TodoId),
    Undo(TodoId),
    Rename(TodoId, String),
    Remove(TodoId),
    Login(LoginCredentials),
    Register(Registration),
    Logout,
    WhoAmI,
    Routes,
    Help,
    Quit,
}

/// 先頭の単語と残りに分ける
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input, ""),
    }
}

fn usage(text: &str) -> ShellError {
    ShellError::Usage(text.to_string())
}

fn parse_id(raw: &str, hint: &str) -> Result<TodoId, ShellError> {
    if raw.is_empty() {
        return Err(usage(hint));
    }
    Ok(raw.parse::<TodoId>()?)
}

impl FromStr for Command {
    type Err = ShellError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (word, rest) = split_word(line);

        if word.starts_with('/') && rest.is_empty() {
            return Ok(Command::Go(word.to_string()));
        }

        match word.to_ascii_lowercase().as_str() {
            "go" | "open" => {
                if rest.is_empty() {
                    return Err(usage("go <path>"));
                }
                Ok(Command::Go(rest.to_string()))
            }
            "list" | "ls" => Ok(Command::List),
            "add" => {
                if rest.is_empty() {
                    return Err(usage("add <title>"));
                }
                Ok(Command::Add(rest.to_string()))
            }
            "done" => Ok(Command::Done(parse_id(rest, "done <id>")?)),
            "undo" => Ok(Command::Undo(parse_id(rest, "undo <id>")?)),
            "rename" => {
                let (id, title) = split_word(rest);
                if title.is_empty() {
                    return Err(usage("rename <id> <title>"));
                }
                Ok(Command::Rename(
                    parse_id(id, "rename <id> <title>")?,
                    title.to_string(),
                ))
            }
            "rm" | "delete" => Ok(Command::Remove(parse_id(rest, "rm <id>")?)),
            "login" => {
                let (email, password) = split_word(rest);
                if email.is_empty() || password.is_empty() {
                    return Err(usage("login <email> <password>"));
                }
                Ok(Command::Login(LoginCredentials::new(email, password)))
            }
            "register" => {
                let (email, rest) = split_word(rest);
                let (name, password) = split_word(rest);
                if email.is_empty() || name.is_empty() || password.is_empty() {
                    return Err(usage("register <email> <name> <password>"));
                }
                Ok(Command::Register(Registration::new(email, name, password)))
            }
            "logout" => Ok(Command::Logout),
            "whoami" | "me" => Ok(Command::WhoAmI),
            "routes" => Ok(Command::Routes),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(ShellError::UnknownCommand(word.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation() {
        assert_eq!("/todos".parse::<Command>().unwrap(), Command::Go("/todos".into()));
        assert_eq!("go /".parse::<Command>().unwrap(), Command::Go("/".into()));
        assert!(matches!("go".parse::<Command>(), Err(ShellError::Usage(_))));
    }

    #[test]
    fn test_todo_commands() {
        assert_eq!(
            "add  Buy milk and eggs ".parse::<Command>().unwrap(),
            Command::Add("Buy milk and eggs".into())
        );
        assert_eq!("done 3".parse::<Command>().unwrap(), Command::Done(TodoId::from(3)));
        assert_eq!("undo 3".parse::<Command>().unwrap(), Command::Undo(TodoId::from(3)));
        assert_eq!("rm 4".parse::<Command>().unwrap(), Command::Remove(TodoId::from(4)));
        assert_eq!(
            "rename 2 Call mom".parse::<Command>().unwrap(),
            Command::Rename(TodoId::from(2), "Call mom".into())
        );
        assert_eq!("LS".parse::<Command>().unwrap(), Command::List);
    }

    #[test]
    fn test_missing_arguments() {
        assert_eq!(
            "add".parse::<Command>(),
            Err(ShellError::Usage("add <title>".into()))
        );
        assert!(matches!("done".parse::<Command>(), Err(ShellError::Usage(_))));
        assert!(matches!("rename 2".parse::<Command>(), Err(ShellError::Usage(_))));
        assert!(matches!(
            "login alice@example.com".parse::<Command>(),
            Err(ShellError::Usage(_))
        ));
        assert!(matches!(
            "register a@example.com Alice".parse::<Command>(),
            Err(ShellError::Usage(_))
        ));
    }

    #[test]
    fn test_auth_commands() {
        assert_eq!(
            "login a@example.com secret".parse::<Command>().unwrap(),
            Command::Login(LoginCredentials::new("a@example.com", "secret"))
        );
        assert_eq!(
            "register a@example.com Alice secret".parse::<Command>().unwrap(),
            Command::Register(Registration::new("a@example.com", "Alice", "secret"))
        );
        assert_eq!("logout".parse::<Command>().unwrap(), Command::Logout);
        assert_eq!("whoami".parse::<Command>().unwrap(), Command::WhoAmI);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            "frobnicate 1".parse::<Command>(),
            Err(ShellError::UnknownCommand("frobnicate".into()))
        );
    }

    #[test]
    fn test_blank_id_is_usage_error() {
        assert!(matches!("done   ".parse::<Command>(), Err(ShellError::Usage(_))));
    }
}
