use super::Message;

/// Prefix of the subscription command.
pub const SUBSCRIBE_PREFIX: &str = "/translate";

/// Exact text of the unsubscription command.
pub const UNSUBSCRIBE_COMMAND: &str = "/stop";

/// Language used when `/translate` carries no argument.
pub const DEFAULT_LANGUAGE: &str = "de";

// Characters skipped before the language argument: "/translate" plus one separator.
const LANGUAGE_OFFSET: usize = SUBSCRIBE_PREFIX.len() + 1;

/// In-band relay commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start (or update) a subscription in the given language.
    Subscribe { language: String },
    /// Drop the sender's subscription.
    Unsubscribe,
    /// Ordinary content to be translated.
    None,
}

impl Command {
    /// Returns `true` when the message is consumed by the relay itself.
    pub const fn is_command(&self) -> bool {
        !matches!(self, Self::None)
    }
}

pub fn interpret(message: &Message) -> Command {
    parse_command(&message.text)
}

/// Classifies a message body.
///
/// The language argument is taken verbatim from the twelfth character on
/// and is not checked against any list of known codes.
pub fn parse_command(text: &str) -> Command {
    if text.starts_with(SUBSCRIBE_PREFIX) {
        let language: String = text.chars().skip(LANGUAGE_OFFSET).collect();

        return if language.is_empty() {
            Command::Subscribe {
                language: DEFAULT_LANGUAGE.to_string(),
            }
        } else {
            Command::Subscribe { language }
        };
    }

    if text == UNSUBSCRIBE_COMMAND {
        return Command::Unsubscribe;
    }

    Command::None
}
