//! Command template parsing and placeholder substitution.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ShimError;

/// A placeholder recognized inside a [`CommandTemplate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// `{prompt}` - content of the last user message.
    Prompt,
    /// `{system}` - selected system prompt text.
    System,
    /// `{system_file}` - path to a temp file holding the system prompt.
    SystemFile,
}

impl Placeholder {
    /// All recognized placeholders.
    pub const ALL: [Self; 3] = [Self::Prompt, Self::System, Self::SystemFile];

    /// The literal token as it appears in a template.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Prompt => "{prompt}",
            Self::System => "{system}",
            Self::SystemFile => "{system_file}",
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// The configured command line, read once at startup and never mutated.
///
/// Braces that do not form a recognized placeholder are left untouched, so
/// templates such as `my-tool {prompt} | awk '{print $1}'` work as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandTemplate {
    raw: String,
}

impl CommandTemplate {
    /// Wrap a template string. Use [`CommandTemplate::validate`] to check it.
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The template as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the template contains the given placeholder.
    #[must_use]
    pub fn uses(&self, placeholder: Placeholder) -> bool {
        self.raw.contains(placeholder.token())
    }

    /// Placeholders present in the template, in declaration order of [`Placeholder::ALL`].
    #[must_use]
    pub fn placeholders(&self) -> Vec<Placeholder> {
        Placeholder::ALL
            .into_iter()
            .filter(|p| self.uses(*p))
            .collect()
    }

    /// A template with nothing to substitute is almost certainly a misconfiguration.
    pub fn validate(&self) -> Result<(), ShimError> {
        if self.raw.trim().is_empty() {
            return Err(ShimError::Configuration(
                "command template is empty".to_string(),
            ));
        }
        if self.placeholders().is_empty() {
            return Err(ShimError::Configuration(format!(
                "command template `{}` contains none of {}, {}, {}",
                self.raw,
                Placeholder::Prompt,
                Placeholder::System,
                Placeholder::SystemFile
            )));
        }
        Ok(())
    }

    /// Substitute every placeholder in a single left-to-right pass.
    ///
    /// Substituted values are never rescanned, so a prompt containing the text
    /// `{system}` is passed through literally.
    pub fn render<'a, F>(&self, mut value_for: F) -> String
    where
        F: FnMut(Placeholder) -> Cow<'a, str>,
    {
        let mut out = String::with_capacity(self.raw.len());
        let mut rest = self.raw.as_str();

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            match Placeholder::ALL.into_iter().find(|p| tail.starts_with(p.token())) {
                Some(placeholder) => {
                    out.push_str(&value_for(placeholder));
                    rest = &tail[placeholder.token().len()..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for CommandTemplate {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CommandTemplate {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
