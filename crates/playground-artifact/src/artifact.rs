//! The [`Artifact`] value
//!
//! An artifact is an immutable `(kind, content)` pair. Its content hash is
//! computed once at construction and is the identity used to decide whether
//! a freshly extracted artifact is materially different from the active one.

use crate::hash::ContentHash;
use crate::kind::ArtifactKind;
use serde::{Deserialize, Serialize};

/// Errors related to artifact construction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArtifactError {
    /// Content was empty after trimming
    #[error("artifact content is empty")]
    EmptyContent,
}

/// Typed, renderable payload extracted from model output
///
/// # Invariants
/// - `hash` is always the hash of `(kind, content)`
/// - Immutable after construction; renderers that allow editing work on
///   their own copy of the content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawArtifact", into = "RawArtifact")]
pub struct Artifact {
    kind: ArtifactKind,
    content: String,
    hash: ContentHash,
}

impl Artifact {
    /// Create new artifact (computes hash and validates)
    ///
    /// # Errors
    /// Returns [`ArtifactError::EmptyContent`] for whitespace-only content
    pub fn new(kind: ArtifactKind, content: impl Into<String>) -> Result<Self, ArtifactError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ArtifactError::EmptyContent);
        }
        let hash = Self::compute_hash(kind, &content);
        Ok(Self {
            kind,
            content,
            hash,
        })
    }

    fn compute_hash(kind: ArtifactKind, content: &str) -> ContentHash {
        ContentHash::compute_parts(&[kind.as_str().as_bytes(), content.as_bytes()])
    }

    /// Artifact kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Reference to content
    #[inline]
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Content hash over `(kind, content)`
    #[inline]
    #[must_use]
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    /// Whether `other` differs materially from `self`
    #[inline]
    #[must_use]
    pub fn differs_from(&self, other: &Artifact) -> bool {
        self.hash != other.hash
    }
}

/// Wire shape: `{ "type": "...", "content": "..." }`
#[derive(Serialize, Deserialize)]
struct RawArtifact {
    #[serde(rename = "type")]
    kind: ArtifactKind,
    content: String,
}

impl TryFrom<RawArtifact> for Artifact {
    type Error = ArtifactError;

    fn try_from(raw: RawArtifact) -> Result<Self, Self::Error> {
        Artifact::new(raw.kind, raw.content)
    }
}

impl From<Artifact> for RawArtifact {
    fn from(artifact: Artifact) -> Self {
        RawArtifact {
            kind: artifact.kind,
            content: artifact.content,
        }
    }
}
