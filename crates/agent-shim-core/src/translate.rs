//! Request translation: chat messages + template → resolved command.
//!
//! The translator picks the prompt (last `user` message) and the system
//! text (per [`SystemPromptPolicy`]), then renders the template. When the
//! template asks for `{system_file}`, a fresh temp file is written and handed
//! to the [`ResolvedCommand`], which deletes it on drop.

use std::borrow::Cow;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ChatMessage, CommandTemplate, MessageRole, Placeholder, ResolvedCommand};
use crate::error::ShimError;

/// Prefix of the temp files created for `{system_file}`.
pub const SYSTEM_FILE_PREFIX: &str = "agent-shim-system-";

/// Which system message(s) feed `{system}` and `{system_file}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemPromptPolicy {
    /// Content of the first `system` message.
    #[default]
    First,
    /// Content of the last `system` message.
    Last,
    /// All `system` messages joined by a blank line.
    Concat,
}

impl SystemPromptPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Concat => "concat",
        }
    }
}

impl fmt::Display for SystemPromptPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SystemPromptPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "concat" => Ok(Self::Concat),
            other => Err(format!(
                "unknown system prompt policy '{other}' (expected first, last or concat)"
            )),
        }
    }
}

/// How substituted values are escaped before landing in the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteMode {
    /// Literal substitution. The content source is trusted.
    #[default]
    Raw,
    /// POSIX shell quoting of every substituted value.
    Shell,
}

impl QuoteMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Shell => "shell",
        }
    }

    fn apply<'a>(self, value: &'a str) -> Result<Cow<'a, str>, ShimError> {
        match self {
            Self::Raw => Ok(Cow::Borrowed(value)),
            Self::Shell => shlex::try_quote(value).map_err(|e| {
                ShimError::Configuration(format!("value cannot be shell-quoted: {e}"))
            }),
        }
    }
}

impl fmt::Display for QuoteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "shell" => Ok(Self::Shell),
            other => Err(format!("unknown quote mode '{other}' (expected raw or shell)")),
        }
    }
}

/// Knobs of the translation step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    pub system_policy: SystemPromptPolicy,
    pub quote_mode: QuoteMode,
    /// Prepend the system text to the prompt when the template has no system placeholder.
    pub fold_system_into_prompt: bool,
}

/// The conversation content that feeds the template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptParts {
    pub prompt: String,
    pub system: String,
}

impl PromptParts {
    /// Select prompt and system text from the message sequence.
    ///
    /// A request without any `user` message yields an empty prompt.
    #[must_use]
    pub fn select(messages: &[ChatMessage], policy: SystemPromptPolicy) -> Self {
        let prompt = messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let mut systems = messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str());

        let system = match policy {
            SystemPromptPolicy::First => systems.next().unwrap_or_default().to_string(),
            SystemPromptPolicy::Last => systems.last().unwrap_or_default().to_string(),
            SystemPromptPolicy::Concat => systems.collect::<Vec<_>>().join("\n\n"),
        };

        Self { prompt, system }
    }
}

/// Resolve the template for one request.
pub fn translate(
    template: &CommandTemplate,
    messages: &[ChatMessage],
    options: TranslateOptions,
) -> Result<ResolvedCommand, ShimError> {
    template.validate()?;

    let PromptParts { mut prompt, system } = PromptParts::select(messages, options.system_policy);

    let template_takes_system =
        template.uses(Placeholder::System) || template.uses(Placeholder::SystemFile);
    if options.fold_system_into_prompt && !template_takes_system && !system.is_empty() {
        prompt = format!("System: {system}\nUser: {prompt}");
    }

    let system_file = if template.uses(Placeholder::SystemFile) {
        Some(write_system_file(&system)?)
    } else {
        None
    };
    let system_file_str = system_file
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    let quoted_prompt = options.quote_mode.apply(&prompt)?;
    let quoted_system = options.quote_mode.apply(&system)?;
    let quoted_file = options.quote_mode.apply(&system_file_str)?;

    let command_line = template.render(|placeholder| match placeholder {
        Placeholder::Prompt => Cow::Borrowed(&*quoted_prompt),
        Placeholder::System => Cow::Borrowed(&*quoted_system),
        Placeholder::SystemFile => Cow::Borrowed(&*quoted_file),
    });

    debug!(
        prompt_len = prompt.len(),
        system_len = system.len(),
        system_file = %system_file_str,
        "Resolved command template"
    );

    let resolved = ResolvedCommand::new(command_line);
    Ok(match system_file {
        Some(path) => resolved.with_system_file(path),
        None => resolved,
    })
}

/// Write the system text to a uniquely named temp file and keep only its path.
fn write_system_file(system: &str) -> Result<tempfile::TempPath, ShimError> {
    let mut file = tempfile::Builder::new()
        .prefix(SYSTEM_FILE_PREFIX)
        .suffix(".txt")
        .tempfile()
        .map_err(ShimError::TempFile)?;
    file.write_all(system.as_bytes())
        .and_then(|()| file.flush())
        .map_err(ShimError::TempFile)?;
    Ok(file.into_temp_path())
}
