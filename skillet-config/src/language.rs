//! Target language for the wrapped code-generation engine.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Source language the external engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    /// Java
    Java,
    /// Kotlin (generated sources are always UTF-8)
    Kotlin,
}

impl TargetLanguage {
    /// Returns the language identifier as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetLanguage::Java => "java",
            TargetLanguage::Kotlin => "kotlin",
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TargetLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "java" => Ok(TargetLanguage::Java),
            "kotlin" | "kt" => Ok(TargetLanguage::Kotlin),
            _ => Err(format!(
                "unknown language '{}', expected 'java' or 'kotlin'",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(
            TargetLanguage::from_str("java").unwrap(),
            TargetLanguage::Java
        );
        assert_eq!(
            TargetLanguage::from_str("kotlin").unwrap(),
            TargetLanguage::Kotlin
        );
        assert_eq!(
            TargetLanguage::from_str("kt").unwrap(),
            TargetLanguage::Kotlin
        );
        assert_eq!(
            TargetLanguage::from_str("Java").unwrap(),
            TargetLanguage::Java
        );
        assert!(TargetLanguage::from_str("scala").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(TargetLanguage::Java.to_string(), "java");
        assert_eq!(TargetLanguage::Kotlin.to_string(), "kotlin");
    }

    #[test]
    fn test_deserialize() {
        let java: TargetLanguage = serde_json::from_str(r#""java""#).unwrap();
        assert_eq!(java, TargetLanguage::Java);

        let kotlin: TargetLanguage = serde_json::from_str(r#""kotlin""#).unwrap();
        assert_eq!(kotlin, TargetLanguage::Kotlin);
    }
}
