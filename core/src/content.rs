use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::GameOutcome;

/// Reference to an illustration the presentation layer can render directly,
/// e.g. a data URI.
pub type ImageRef = String;

/// Fixed placeholder shown when illustration generation fails. Substituting it
/// is non-fatal to the session.
pub const FALLBACK_IMAGE: &str = "data:image/svg+xml;charset=utf-8,\
%3Csvg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'%3E\
%3Crect width='100' height='100' fill='%23cfd8dc'/%3E\
%3Ctext x='50' y='62' font-size='40' text-anchor='middle' fill='%23546e7a'%3E?%3C/text%3E\
%3C/svg%3E";

/// One round of generated content: the secret word, the hint shown to the
/// player, and a description for the hidden illustration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordContent {
    pub word: String,
    pub hint: String,
    pub image_description: String,
}

/// Raw failure reported by a content provider, before classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ContentError(pub String);

/// Content Generation Provider boundary.
///
/// Word and illustration generation are asynchronous and fallible; the result
/// postcard is built locally from state already in hand and must not fail.
#[allow(async_fn_in_trait)]
pub trait ContentSource {
    /// A new word, hint and illustration description, avoiding recently
    /// played words.
    async fn generate_word(&self, exclude: &[String]) -> Result<WordContent, ContentError>;

    /// An illustration matching the word. Callers substitute
    /// [`FALLBACK_IMAGE`] on failure.
    async fn generate_hidden_image(
        &self,
        word: &str,
        description: &str,
    ) -> Result<ImageRef, ContentError>;

    /// The result postcard for a finished session. Pure and local.
    fn result_artifact(&self, outcome: GameOutcome, word: &str) -> ImageRef;
}

/// User-facing classification of a content-acquisition failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentFailure {
    /// The provider rejected our credentials or the key lacks access.
    Permission,
    /// The provider is rate limiting us; retrying later can work.
    Quota,
    /// Anything else, with the raw message kept for display.
    Connection(String),
}

impl ContentFailure {
    const PERMISSION_MARKERS: &'static [&'static str] =
        &["permission", "forbidden", "unauthorized", "api key", "401", "403"];
    const QUOTA_MARKERS: &'static [&'static str] =
        &["429", "rate limit", "quota", "resource_exhausted"];

    /// First matching rule wins, evaluated on the raw failure message.
    pub fn classify(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        if Self::PERMISSION_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            Self::Permission
        } else if Self::QUOTA_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            Self::Quota
        } else {
            Self::Connection(raw.to_string())
        }
    }
}

impl fmt::Display for ContentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permission => {
                write!(f, "El servei de contingut ha rebutjat la clau (error de permisos o de configuració)")
            }
            Self::Quota => {
                write!(f, "S'ha esgotat la quota del servei de contingut, torna-ho a provar d'aquí una estona")
            }
            Self::Connection(raw) => {
                write!(f, "No s'ha pogut contactar amb el servei de contingut: {raw}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_messages_classify_as_quota() {
        assert_eq!(ContentFailure::classify("HTTP 429 Too Many Requests"), ContentFailure::Quota);
        assert_eq!(ContentFailure::classify("RESOURCE_EXHAUSTED"), ContentFailure::Quota);
    }

    #[test]
    fn auth_messages_classify_as_permission() {
        assert_eq!(ContentFailure::classify("403 Forbidden"), ContentFailure::Permission);
        assert_eq!(ContentFailure::classify("invalid API key"), ContentFailure::Permission);
    }

    #[test]
    fn permission_wins_over_quota_when_both_match() {
        assert_eq!(
            ContentFailure::classify("forbidden: quota policy"),
            ContentFailure::Permission,
        );
    }

    #[test]
    fn anything_else_keeps_the_raw_message() {
        let failure = ContentFailure::classify("connection reset by peer");
        assert_eq!(failure, ContentFailure::Connection("connection reset by peer".into()));
        assert!(failure.to_string().contains("connection reset by peer"));
    }
}
