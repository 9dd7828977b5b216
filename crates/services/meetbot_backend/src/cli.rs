// --- File: crates/services/meetbot_backend/src/cli.rs ---
use meetbot_common::{config_error, MeetbotError};
use std::path::PathBuf;

pub const USAGE: &str = "usage: meetbot-backend [.env-file] [run | import-credentials <file>]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the bot until Ctrl-C.
    Run,
    /// Validate a Google credential JSON and store it.
    ImportCredentials(PathBuf),
}

impl Command {
    /// Parses the arguments after the program name.
    ///
    /// A leading argument starting with `.env` selects the dotenv file and
    /// is skipped here.
    pub fn parse<I>(args: I) -> Result<Self, MeetbotError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter().peekable();
        if args.peek().is_some_and(|arg| arg.starts_with(".env")) {
            args.next();
        }

        let command = match args.next().as_deref() {
            None | Some("run") => Command::Run,
            Some("import-credentials") => match args.next() {
                Some(path) => Command::ImportCredentials(PathBuf::from(path)),
                None => return Err(config_error(format!("missing credential file\n{}", USAGE))),
            },
            Some(other) => {
                return Err(config_error(format!("unknown command `{}`\n{}", other, USAGE)))
            }
        };

        match args.next() {
            Some(extra) => Err(config_error(format!("unexpected argument `{}`\n{}", extra, USAGE))),
            None => Ok(command),
        }
    }
}
