//! Backend identity value object

use serde::{Deserialize, Serialize};

/// Identity of an analysis backend (Value Object)
///
/// Backends are registered by name in configuration ("claude", "gemini",
/// "openrouter", ...). The id is what tags every issue a backend produces
/// and what the output report keys its issue map by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendId(String);

impl BackendId {
    /// Create a backend id, rejecting empty or whitespace-only names
    pub fn try_new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BackendId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BackendId {
    type Err = crate::core::error::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_new(s).ok_or_else(|| crate::core::error::DomainError::InvalidBackend(s.to_string()))
    }
}

impl From<&str> for BackendId {
    /// Lenient conversion for literals; empty input becomes `"unknown"`.
    fn from(s: &str) -> Self {
        Self::try_new(s).unwrap_or_else(|| Self("unknown".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_id_trims() {
        let id = BackendId::try_new("  claude ").unwrap();
        assert_eq!(id.as_str(), "claude");
        assert_eq!(id.to_string(), "claude");
    }

    #[test]
    fn test_backend_id_rejects_empty() {
        assert!(BackendId::try_new("   ").is_none());
        assert!("".parse::<BackendId>().is_err());
    }

    #[test]
    fn test_backend_id_serializes_as_string() {
        let id = BackendId::from("gemini");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"gemini\"");
    }
}
