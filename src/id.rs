use crate::error::{SimError, SimResult};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Namespaced identifier: `(namespace, local)`, written `"ns:local"`.
///
/// The pair is the identity; two ids are equal iff both fields are equal.
/// Registries key every table by `Id`, and save games store ids as their
/// qualified string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id {
    namespace: String,
    local: String,
}

impl Id {
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Parse a fully-qualified `"ns:local"` literal.
    pub fn parse(qualified: &str) -> SimResult<Self> {
        match qualified.split_once(':') {
            Some((ns, local)) if !ns.is_empty() && !local.is_empty() => {
                Ok(Self::new(ns, local))
            }
            _ => Err(SimError::InvalidArgument(format!(
                "malformed id '{}': expected 'ns:local'",
                qualified
            ))),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    pub fn qualified(&self) -> String {
        format!("{}:{}", self.namespace, self.local)
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.local)
    }
}

// Ids travel through JSON as their qualified string form.

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.qualified())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Id::parse(&s).map_err(|e| D::Error::custom(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        let id = Id::parse("demo:normal_logs").unwrap();
        assert_eq!(id.namespace(), "demo");
        assert_eq!(id.local(), "normal_logs");
        assert_eq!(id.qualified(), "demo:normal_logs");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Id::parse("no_namespace").is_err());
        assert!(Id::parse(":local").is_err());
        assert!(Id::parse("ns:").is_err());
    }

    #[test]
    fn test_equality_is_on_both_fields() {
        assert_eq!(Id::new("a", "x"), Id::new("a", "x"));
        assert_ne!(Id::new("a", "x"), Id::new("b", "x"));
        assert_ne!(Id::new("a", "x"), Id::new("a", "y"));
    }

    #[test]
    fn test_json_form_is_string() {
        let id = Id::new("demo", "shrimp");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"demo:shrimp\"");
        let back: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
