//! Command registry.
//!
//! A fixed table of named commands built once at startup. Each entry
//! carries its documentation text as plain data; the help listing is
//! derived from it.

use crate::bot::message::OutboundMessage;
use crate::commands::CommandError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Keyword that lists all commands instead of running one.
pub const HELP_KEYWORD: &str = "コマンド";

/// Business logic of one command.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Run the command with the tokens following its name.
    ///
    /// `Ok(None)` means the command deliberately sends nothing.
    async fn handle(&self, args: &[String]) -> Result<Option<OutboundMessage>, CommandError>;
}

/// Errors raised while building the registry
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Name registered twice
    #[error("command already registered: {0}")]
    Duplicate(String),
    /// Name is empty, contains whitespace, or is the help keyword
    #[error("invalid command name: {0:?}")]
    InvalidName(String),
}

/// One registered command.
#[derive(Clone)]
pub struct Command {
    name: String,
    description: String,
    handler: Arc<dyn CommandHandler>,
}

impl Command {
    /// Command name (first token of the command line).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full documentation text as registered.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// First sentence of the description.
    #[must_use]
    pub fn title(&self) -> String {
        split_description(&self.description).0
    }

    /// Description without its first sentence, one trimmed line per line.
    #[must_use]
    pub fn details(&self) -> String {
        split_description(&self.description).1
    }

    /// Handler invoked for this command.
    #[must_use]
    pub fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.handler
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("title", &self.title())
            .finish_non_exhaustive()
    }
}

/// Split documentation at the first sentence boundary.
///
/// The boundary is a `.` or `。` that ends a line; without one the first
/// line is the title. A `.` terminator is a separator and is dropped from
/// the title, `。` is kept. Indentation of the remaining lines is stripped and
/// blank lines are dropped.
fn split_description(doc: &str) -> (String, String) {
    let doc = doc.trim();
    let boundary = lazy_regex::regex!(r"[.。][ \t]*(\r?\n|$)");

    let (title, rest) = match boundary.find(doc) {
        Some(m) if !doc[..m.start()].contains('\n') => {
            let title_end = if doc[m.start()..].starts_with('。') {
                m.start() + '。'.len_utf8()
            } else {
                m.start()
            };
            (&doc[..title_end], &doc[m.end()..])
        }
        _ => doc.split_once('\n').unwrap_or((doc, "")),
    };

    let details = rest
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    (title.trim().to_string(), details)
}

/// Ordered, immutable table of commands.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. Order of registration is the listing order.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if the name is invalid or already taken.
    pub fn register(
        &mut self,
        name: &str,
        description: &str,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<&mut Self, RegistryError> {
        if name.is_empty() || name.chars().any(char::is_whitespace) || name == HELP_KEYWORD {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        if self.get(name).is_some() {
            return Err(RegistryError::Duplicate(name.to_string()));
        }

        self.commands.push(Command {
            name: name.to_string(),
            description: description.to_string(),
            handler,
        });
        Ok(self)
    }

    /// Look up a command by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no command is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Arc<dyn CommandHandler> {
        Arc::new(MockCommandHandler::new())
    }

    #[test]
    fn test_split_description_ascii_period() {
        let (title, details) = split_description(
            "ランチ営業店舗検索.\n\n    一行目。\n    二行目。\n    ",
        );
        assert_eq!(title, "ランチ営業店舗検索");
        assert_eq!(details, "一行目。\n二行目。");
    }

    #[test]
    fn test_split_description_japanese_period() {
        let (title, details) = split_description("新着記事取得。\n3件取得します。");
        assert_eq!(title, "新着記事取得。");
        assert_eq!(details, "3件取得します。");
    }

    #[test]
    fn test_split_description_without_boundary() {
        let (title, details) = split_description("Weekly Report\n最新号を通知します");
        assert_eq!(title, "Weekly Report");
        assert_eq!(details, "最新号を通知します");

        let (title, details) = split_description("Weekly Report\n最新号を通知します。");
        assert_eq!(title, "Weekly Report");
        assert_eq!(details, "最新号を通知します。");

        let (title, details) = split_description("single line");
        assert_eq!(title, "single line");
        assert_eq!(details, "");
    }

    #[test]
    fn test_period_inside_sentence_is_not_a_boundary() {
        let (title, _) = split_description("Qiita v2.0 API.\ndetails");
        assert_eq!(title, "Qiita v2.0 API");
    }

    #[test]
    fn test_register_preserves_order() -> Result<(), RegistryError> {
        let mut registry = CommandRegistry::new();
        registry
            .register("lunch", "a.", noop())?
            .register("qiita", "b.", noop())?
            .register("nomitai", "c.", noop())?;

        let names: Vec<&str> = registry.iter().map(Command::name).collect();
        assert_eq!(names, vec!["lunch", "qiita", "nomitai"]);
        assert_eq!(registry.len(), 3);
        Ok(())
    }

    #[test]
    fn test_register_rejects_duplicates_and_bad_names() {
        let mut registry = CommandRegistry::new();
        assert!(registry.register("lunch", "a.", noop()).is_ok());
        assert_eq!(
            registry.register("lunch", "b.", noop()).err(),
            Some(RegistryError::Duplicate("lunch".to_string()))
        );
        assert!(matches!(
            registry.register(HELP_KEYWORD, "x.", noop()),
            Err(RegistryError::InvalidName(_))
        ));
        assert!(matches!(
            registry.register("two words", "x.", noop()),
            Err(RegistryError::InvalidName(_))
        ));
        assert!(matches!(
            registry.register("", "x.", noop()),
            Err(RegistryError::InvalidName(_))
        ));
        assert_eq!(registry.len(), 1);
    }
}
