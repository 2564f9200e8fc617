//! Line commands and their execution against a [`Messenger`].

use std::io::{BufRead, Write};

use serde_json::{json, Value};
use tracing::{debug, warn};

use palaver_store::{ContainerKind, MessageLog, Messenger, StoreError};

use crate::dto::{ConversationDto, GroupDto, MessageDto};
use crate::error::CliError;

type Result<T> = std::result::Result<T, CliError>;

/// Limit argument for history views. `Count(None)` shows the full history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Default,
    Count(Option<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register { id: String, name: String },
    Login(String),
    Logout,
    WhoAmI,
    Users,
    Send { to: String, text: String },
    Conversation { other: String, limit: Limit },
    Conversations,
    GroupCreate { name: String, members: Vec<String> },
    GroupSend { group: String, text: String },
    Group { group: String, limit: Limit },
    Groups,
    GroupAdd { group: String, user: String },
    GroupRemove { group: String, user: String },
    GroupRename { group: String, name: String },
    Like { kind: ContainerKind, container: String, message: String },
    Unlike { kind: ContainerKind, container: String, message: String },
    Read { kind: ContainerKind, container: String },
    Stats,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut args = Args::new(line);
        let Some(verb) = args.next_word() else {
            return Ok(None);
        };

        let command = match verb {
            "register" => {
                const USAGE: &str = "register <id> <name...>";
                Command::Register {
                    id: args.word(USAGE)?,
                    name: args.rest(USAGE)?,
                }
            }
            "login" => Command::Login(args.word("login <id>")?),
            "logout" => Command::Logout,
            "whoami" => Command::WhoAmI,
            "users" => Command::Users,
            "send" => {
                const USAGE: &str = "send <to> <text...>";
                Command::Send {
                    to: args.word(USAGE)?,
                    text: args.rest(USAGE)?,
                }
            }
            "conversation" => Command::Conversation {
                other: args.word("conversation <other> [limit]")?,
                limit: args.limit()?,
            },
            "conversations" => Command::Conversations,
            "group-create" => Command::GroupCreate {
                // The name is a single word here; `group-rename` can add spaces.
                name: args.word("group-create <one-word-name> [member...] (use group-rename for names with spaces)")?,
                members: args.remaining_words(),
            },
            "group-send" => {
                const USAGE: &str = "group-send <group> <text...>";
                Command::GroupSend {
                    group: args.word(USAGE)?,
                    text: args.rest(USAGE)?,
                }
            }
            "group" => Command::Group {
                group: args.word("group <group> [limit]")?,
                limit: args.limit()?,
            },
            "groups" => Command::Groups,
            "group-add" => {
                const USAGE: &str = "group-add <group> <user>";
                Command::GroupAdd {
                    group: args.word(USAGE)?,
                    user: args.word(USAGE)?,
                }
            }
            "group-remove" => {
                const USAGE: &str = "group-remove <group> <user>";
                Command::GroupRemove {
                    group: args.word(USAGE)?,
                    user: args.word(USAGE)?,
                }
            }
            "group-rename" => {
                const USAGE: &str = "group-rename <group> <name...>";
                Command::GroupRename {
                    group: args.word(USAGE)?,
                    name: args.rest(USAGE)?,
                }
            }
            "like" | "unlike" => {
                const USAGE: &str = "like|unlike <dm|group> <container> <message>";
                let kind = args.kind(USAGE)?;
                let container = args.word(USAGE)?;
                let message = args.word(USAGE)?;
                if verb == "like" {
                    Command::Like { kind, container, message }
                } else {
                    Command::Unlike { kind, container, message }
                }
            }
            "read" => {
                const USAGE: &str = "read <dm|group> <container>";
                Command::Read {
                    kind: args.kind(USAGE)?,
                    container: args.word(USAGE)?,
                }
            }
            "stats" => Command::Stats,
            "quit" | "exit" => Command::Quit,
            other => return Err(CliError::UnknownCommand(other.to_string())),
        };
        Ok(Some(command))
    }
}

// ---------------------------------------------------------------------------
// Argument scanning
// ---------------------------------------------------------------------------

struct Args<'a> {
    rest: &'a str,
}

impl<'a> Args<'a> {
    fn new(line: &'a str) -> Self {
        Self { rest: line.trim() }
    }

    fn next_word(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let end = self.rest.find(char::is_whitespace).unwrap_or(self.rest.len());
        let word = &self.rest[..end];
        self.rest = self.rest[end..].trim_start();
        Some(word)
    }

    fn word(&mut self, usage: &'static str) -> Result<String> {
        self.next_word()
            .map(str::to_string)
            .ok_or(CliError::Usage(usage))
    }

    /// Everything left on the line, inner spacing preserved.
    fn rest(&mut self, usage: &'static str) -> Result<String> {
        if self.rest.is_empty() {
            return Err(CliError::Usage(usage));
        }
        Ok(std::mem::take(&mut self.rest).to_string())
    }

    fn remaining_words(&mut self) -> Vec<String> {
        std::iter::from_fn(|| self.next_word())
            .map(str::to_string)
            .collect()
    }

    /// `all` or a negative number means the whole history.
    fn limit(&mut self) -> Result<Limit> {
        let Some(raw) = self.next_word() else {
            return Ok(Limit::Default);
        };
        if raw == "all" {
            return Ok(Limit::Count(None));
        }
        match raw.parse::<i64>() {
            Ok(n) if n < 0 => Ok(Limit::Count(None)),
            Ok(n) => usize::try_from(n)
                .map(|n| Limit::Count(Some(n)))
                .map_err(|_| CliError::InvalidLimit(raw.to_string())),
            Err(_) => Err(CliError::InvalidLimit(raw.to_string())),
        }
    }

    fn kind(&mut self, usage: &'static str) -> Result<ContainerKind> {
        match self.next_word() {
            Some("dm") | Some("conversation") => Ok(ContainerKind::Conversation),
            Some("group") => Ok(ContainerKind::Group),
            Some(other) => Err(CliError::InvalidKind(other.to_string())),
            None => Err(CliError::Usage(usage)),
        }
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Run one command and return the value printed under `"ok"`.
pub fn execute(messenger: &mut Messenger, command: Command, default_limit: usize) -> Result<Value> {
    let resolve = |limit: Limit| match limit {
        Limit::Default => Some(default_limit),
        Limit::Count(n) => n,
    };

    let value = match command {
        Command::Register { id, name } => {
            messenger.register(&id, &name)?;
            json!({ "id": id, "displayName": name })
        }
        Command::Login(id) => {
            messenger.login(&id)?;
            json!({ "id": id, "displayName": messenger.current_user_name() })
        }
        Command::Logout => json!({ "loggedOut": messenger.logout() }),
        Command::WhoAmI => json!({
            "id": messenger.current_user(),
            "displayName": messenger.current_user_name(),
        }),
        Command::Users => serde_json::to_value(messenger.list_users())?,
        Command::Send { to, text } => {
            let message = messenger.send_direct_message(&to, &text)?;
            serde_json::to_value(MessageDto::from(&message))?
        }
        Command::Conversation { other, limit } => {
            let me = messenger.current_user().ok_or(StoreError::NotAuthenticated)?;
            let conv = messenger
                .conversation(me, &other)
                .ok_or_else(|| CliError::NoConversation(other.clone()))?;
            serde_json::to_value(ConversationDto::with_recent(conv, resolve(limit)))?
        }
        Command::Conversations => {
            let convs: Vec<ConversationDto> = messenger
                .my_conversations()?
                .into_iter()
                .map(|c| ConversationDto::with_recent(c, Some(0)))
                .collect();
            serde_json::to_value(convs)?
        }
        Command::GroupCreate { name, members } => {
            let group = messenger.create_group(&name, &members)?;
            serde_json::to_value(GroupDto::with_recent(&group, Some(0)))?
        }
        Command::GroupSend { group, text } => {
            let message = messenger.send_group_message(&group, &text)?;
            serde_json::to_value(MessageDto::from(&message))?
        }
        Command::Group { group, limit } => {
            let me = messenger.current_user().ok_or(StoreError::NotAuthenticated)?;
            let found = messenger
                .group(&group)
                .ok_or_else(|| StoreError::UnknownGroup(group.clone()))?;
            if !found.is_participant(me) {
                return Err(StoreError::NotGroupMember(group).into());
            }
            serde_json::to_value(GroupDto::with_recent(found, resolve(limit)))?
        }
        Command::Groups => {
            let groups: Vec<GroupDto> = messenger
                .my_groups()?
                .into_iter()
                .map(|g| GroupDto::with_recent(g, Some(0)))
                .collect();
            serde_json::to_value(groups)?
        }
        Command::GroupAdd { group, user } => {
            messenger.add_group_member(&group, &user)?;
            json!({ "group": group, "added": user })
        }
        Command::GroupRemove { group, user } => {
            messenger.remove_group_member(&group, &user)?;
            json!({ "group": group, "removed": user })
        }
        Command::GroupRename { group, name } => {
            messenger.rename_group(&group, &name)?;
            json!({ "group": group, "name": name })
        }
        Command::Like { kind, container, message } => {
            json!({ "changed": messenger.like(&message, &container, kind)? })
        }
        Command::Unlike { kind, container, message } => {
            json!({ "changed": messenger.unlike(&message, &container, kind)? })
        }
        Command::Read { kind, container } => {
            json!({ "marked": messenger.mark_read(&container, kind)? })
        }
        Command::Stats => serde_json::to_value(messenger.statistics())?,
        Command::Quit => Value::Null,
    };
    Ok(value)
}

/// Read commands from `input` until `quit` or end of input, writing one JSON
/// object per command to `output`. Failed commands never stop the loop.
pub fn run<R: BufRead, W: Write>(
    messenger: &mut Messenger,
    input: R,
    mut output: W,
    default_limit: usize,
) -> std::io::Result<()> {
    for line in input.lines() {
        let line = line?;
        let reply = match Command::parse(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => {
                debug!(?command, "executing");
                execute(messenger, command, default_limit)
            }
            Err(e) => Err(e),
        };

        let body = match reply {
            Ok(value) => json!({ "ok": value }),
            Err(e) => {
                warn!(error = %e, "command failed");
                e.to_json()
            }
        };
        writeln!(output, "{body}")?;
        output.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_script(script: &str) -> Vec<Value> {
        let dir = tempfile::tempdir().unwrap();
        let mut messenger = Messenger::open_in(dir.path()).unwrap();
        let mut out = Vec::new();
        run(&mut messenger, script.as_bytes(), &mut out, 20).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_parse_keeps_message_spacing() {
        let cmd = Command::parse("send  u2   hello,  world").unwrap().unwrap();
        assert_eq!(
            cmd,
            Command::Send {
                to: "u2".into(),
                text: "hello,  world".into()
            }
        );
    }

    #[test]
    fn test_parse_blank_and_unknown() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert!(matches!(Command::parse("dance"), Err(CliError::UnknownCommand(_))));
        assert!(matches!(Command::parse("send u2"), Err(CliError::Usage(_))));
        assert!(matches!(Command::parse("read channel x"), Err(CliError::InvalidKind(_))));
    }

    #[test]
    fn test_parse_limits() {
        let limit_of = |line: &str| match Command::parse(line).unwrap().unwrap() {
            Command::Conversation { limit, .. } => limit,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(limit_of("conversation u2"), Limit::Default);
        assert_eq!(limit_of("conversation u2 5"), Limit::Count(Some(5)));
        assert_eq!(limit_of("conversation u2 -1"), Limit::Count(None));
        assert_eq!(limit_of("conversation u2 all"), Limit::Count(None));
        assert!(matches!(
            Command::parse("conversation u2 lots"),
            Err(CliError::InvalidLimit(_))
        ));
    }

    #[test]
    fn test_parse_group_create_members() {
        let cmd = Command::parse("group-create Team u2 u3").unwrap().unwrap();
        assert_eq!(
            cmd,
            Command::GroupCreate {
                name: "Team".into(),
                members: vec!["u2".into(), "u3".into()]
            }
        );
    }

    #[test]
    fn test_group_create_name_is_one_word() {
        let cmd = Command::parse("group-create Core Team u2").unwrap().unwrap();
        assert_eq!(
            cmd,
            Command::GroupCreate {
                name: "Core".into(),
                members: vec!["Team".into(), "u2".into()]
            }
        );

        let err = Command::parse("group-create").unwrap_err();
        assert!(err.to_string().contains("one-word-name"));
        assert!(err.to_string().contains("group-rename"));

        let rename = Command::parse("group-rename g1 Core Team").unwrap().unwrap();
        assert_eq!(
            rename,
            Command::GroupRename {
                group: "g1".into(),
                name: "Core Team".into()
            }
        );
    }

    #[test]
    fn test_script_direct_messages() {
        let replies = run_script(
            "register u1 Alice Smith\n\
             register u2 Bob\n\
             send u2 hi\n\
             login u1\n\
             send u2 hi there\n\
             conversation u2\n\
             stats\n\
             quit\n\
             whoami\n",
        );

        assert_eq!(replies.len(), 7);
        assert_eq!(replies[0]["ok"]["displayName"], "Alice Smith");
        assert_eq!(replies[2]["error"], "Not logged in");
        assert_eq!(replies[4]["ok"]["content"], "hi there");
        assert_eq!(replies[5]["ok"]["messages"][0]["senderId"], "u1");
        assert_eq!(replies[6]["ok"]["messages"], 1);
    }

    #[test]
    fn test_script_groups() {
        let replies = run_script(
            "register u1 Alice\n\
             register u2 Bob\n\
             login u1\n\
             group-create Team u2\n\
             groups\n\
             login u2\n\
             group-add group_missing u1\n\
             stats\n",
        );

        assert_eq!(replies[3]["ok"]["adminId"], "u1");
        assert_eq!(replies[4]["ok"].as_array().unwrap().len(), 1);
        assert!(replies[6]["error"].is_string());
        assert_eq!(replies[7]["ok"]["groups"], 1);
    }

    #[test]
    fn test_like_through_commands() {
        let dir = tempfile::tempdir().unwrap();
        let mut messenger = Messenger::open_in(dir.path()).unwrap();
        messenger.register("u1", "Alice").unwrap();
        messenger.register("u2", "Bob").unwrap();
        messenger.login("u1").unwrap();
        let msg = messenger.send_direct_message("u2", "hi").unwrap();

        let like = Command::parse(&format!("like dm conv_u1_u2 {}", msg.id()))
            .unwrap()
            .unwrap();
        let first = execute(&mut messenger, like.clone(), 20).unwrap();
        let second = execute(&mut messenger, like, 20).unwrap();
        assert_eq!(first["changed"], true);
        assert_eq!(second["changed"], false);

        let read = Command::parse("read dm conv_u1_u2").unwrap().unwrap();
        assert_eq!(execute(&mut messenger, read, 20).unwrap()["marked"], 0);
    }
}
