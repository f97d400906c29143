//! Interactive translation session: input limits, language selection and status text
//!
//! This is the caller side of [`FreeTranslator`]. It trims and optionally
//! truncates input, keeps source and target languages apart, and turns every
//! outcome (including errors) into text that can be shown to a user.

use std::borrow::Cow;

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::client::FreeTranslator;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{validate_language_code, ProviderKind, TranslationRequest, AUTO_LANGUAGE};

pub const DEFAULT_TARGET: &str = "en";
const ALTERNATE_TARGET: &str = "vi";

/// Input character limit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputPolicy {
    /// `None` is unbounded
    pub max_length: Option<usize>,
}

impl InputPolicy {
    pub fn unbounded() -> Self {
        Self { max_length: None }
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length: Some(max_length),
        }
    }

    /// Trim, then cut to `max_length` characters
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let text = text.trim();
        match self.max_length {
            Some(max) if text.chars().count() > max => {
                Cow::Owned(text.chars().take(max).collect())
            }
            _ => Cow::Borrowed(text),
        }
    }

    /// `"12/5000"`, or just `"12"` when unbounded
    pub fn char_count(&self, text: &str) -> String {
        let count = text.chars().count();
        match self.max_length {
            Some(max) => format!("{}/{}", count, max),
            None => count.to_string(),
        }
    }
}

/// Source and target languages, never equal (unless source is `auto`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageSelection {
    source: String,
    target: String,
}

impl Default for LanguageSelection {
    fn default() -> Self {
        Self {
            source: AUTO_LANGUAGE.to_string(),
            target: DEFAULT_TARGET.to_string(),
        }
    }
}

fn default_target_avoiding(code: &str) -> String {
    if code == DEFAULT_TARGET {
        ALTERNATE_TARGET.to_string()
    } else {
        DEFAULT_TARGET.to_string()
    }
}

impl LanguageSelection {
    pub fn new(source: &str, target: &str) -> Result<Self> {
        let mut selection = Self::default();
        selection.set_target(target)?;
        selection.set_source(source)?;
        Ok(selection)
    }

    /// Take the pair as given: an `auto` target or a source equal to the
    /// target is rejected instead of being rearranged
    pub fn strict(source: &str, target: &str) -> Result<Self> {
        let source = validate_language_code(source)?;
        let target = validate_language_code(target)?;
        if target == AUTO_LANGUAGE || target == source {
            return Err(TranslationError::InvalidLanguage { code: target });
        }
        Ok(Self { source, target })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Change the source; a clash with the target moves the old source over
    pub fn set_source(&mut self, code: &str) -> Result<()> {
        let code = validate_language_code(code)?;
        if code == self.target {
            let previous = std::mem::replace(&mut self.source, code);
            self.target = if previous == AUTO_LANGUAGE {
                default_target_avoiding(&self.source)
            } else {
                previous
            };
        } else {
            self.source = code;
        }
        Ok(())
    }

    /// Change the target; a clash with the source moves the old target over
    pub fn set_target(&mut self, code: &str) -> Result<()> {
        let code = validate_language_code(code)?;
        if code == AUTO_LANGUAGE {
            return Err(TranslationError::InvalidLanguage { code });
        }
        if code == self.source {
            self.source = std::mem::replace(&mut self.target, code);
        } else {
            self.target = code;
        }
        Ok(())
    }

    /// Exchange source and target; a no-op while the source is `auto`
    pub fn swap(&mut self) -> bool {
        if self.source == AUTO_LANGUAGE {
            return false;
        }
        std::mem::swap(&mut self.source, &mut self.target);
        true
    }
}

/// Status line shown next to the output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SessionStatus {
    /// Nothing to translate
    Ready,
    /// Another translation was still running
    Busy,
    Translated(ProviderKind),
    Failed(String),
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Ready => write!(f, "🟢 Ready, enter text to translate"),
            SessionStatus::Busy => write!(f, "🔄 Still translating, try again"),
            SessionStatus::Translated(provider) => write!(f, "✅ Translated ({})", provider),
            SessionStatus::Failed(_) => write!(f, "❌ Translation failed"),
        }
    }
}

/// Result of one submitted input
#[derive(Debug, Clone, Serialize)]
pub struct SessionOutcome {
    pub output: String,
    pub status: SessionStatus,
    /// Input was cut to the character limit
    pub truncated: bool,
    pub char_count: String,
}

/// A translator plus the state a user interface keeps around it
#[derive(Debug, Clone)]
pub struct TranslationSession {
    translator: FreeTranslator,
    languages: LanguageSelection,
    policy: InputPolicy,
}

impl TranslationSession {
    pub fn new(translator: FreeTranslator, policy: InputPolicy) -> Self {
        Self {
            translator,
            languages: LanguageSelection::default(),
            policy,
        }
    }

    pub fn with_languages(mut self, languages: LanguageSelection) -> Self {
        self.languages = languages;
        self
    }

    pub fn translator(&self) -> &FreeTranslator {
        &self.translator
    }

    pub fn languages(&self) -> &LanguageSelection {
        &self.languages
    }

    pub fn languages_mut(&mut self) -> &mut LanguageSelection {
        &mut self.languages
    }

    pub fn policy(&self) -> InputPolicy {
        self.policy
    }

    pub async fn set_method(&self, name: &str) -> Result<ProviderKind> {
        self.translator.set_method(name).await
    }

    /// Translate `input` with the current selection. Never fails: errors become
    /// output text and a `Failed` status.
    pub async fn submit(&self, input: &str) -> SessionOutcome {
        let text = self.policy.apply(input);
        let truncated = text.chars().count() < input.trim().chars().count();
        let char_count = self.policy.char_count(&text);

        if text.is_empty() {
            return SessionOutcome {
                output: String::new(),
                status: SessionStatus::Ready,
                truncated,
                char_count,
            };
        }

        if truncated {
            debug!("Input truncated to {}", char_count);
        }

        let request = TranslationRequest::new(&*text, self.languages.target())
            .with_source_lang(self.languages.source());

        let (output, status) = match self.translator.translate(&request).await {
            Ok(result) => match result.provider_used {
                Some(provider) => (result.translated_text, SessionStatus::Translated(provider)),
                None => (String::new(), SessionStatus::Busy),
            },
            Err(e) => {
                warn!("Translation failed: {}", e);
                let message = e.to_string();
                (format!("❌ Error: {}", message), SessionStatus::Failed(message))
            }
        };

        SessionOutcome {
            output,
            status,
            truncated,
            char_count,
        }
    }
}
