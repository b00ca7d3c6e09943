//! Generation strategy flags.

use serde::{Deserialize, Serialize};

use crate::TargetLanguage;

/// Value of a single entry in the `[flags]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    /// Toggle, e.g. `records = true`
    Bool(bool),
    /// Mode selector, e.g. `pojos = "immutable"`
    Text(String),
}

impl FlagValue {
    /// Stable textual form, used for fingerprinting and display.
    pub fn as_canonical(&self) -> String {
        match self {
            FlagValue::Bool(b) => b.to_string(),
            FlagValue::Text(s) => s.clone(),
        }
    }
}

/// Flags the engine understands regardless of target language.
const COMMON_FLAGS: &[&str] = &[
    "comments",
    "daos",
    "deprecated",
    "fluent_setters",
    "global_object_references",
    "immutable_pojos",
    "indexes",
    "interfaces",
    "javadoc",
    "keys",
    "pojos",
    "records",
    "routines",
    "sequences",
    "tables",
    "udts",
    "validation_annotations",
];

/// Flags only meaningful for Java output.
const JAVA_FLAGS: &[&str] = &["generated_annotation", "generated_annotation_type"];

/// Flags only meaningful for Kotlin output.
const KOTLIN_FLAGS: &[&str] = &[
    "kotlin_defaulted_nullability",
    "kotlin_not_null_interface_attributes",
    "kotlin_not_null_pojo_attributes",
    "kotlin_not_null_record_attributes",
];

/// Check whether a flag key is valid for the given target language.
pub fn is_known_flag(language: TargetLanguage, key: &str) -> bool {
    if COMMON_FLAGS.contains(&key) {
        return true;
    }
    match language {
        TargetLanguage::Java => JAVA_FLAGS.contains(&key),
        TargetLanguage::Kotlin => KOTLIN_FLAGS.contains(&key),
    }
}

/// All flag keys valid for the given target language, sorted.
pub fn known_flags(language: TargetLanguage) -> Vec<&'static str> {
    let specific = match language {
        TargetLanguage::Java => JAVA_FLAGS,
        TargetLanguage::Kotlin => KOTLIN_FLAGS,
    };
    let mut keys: Vec<&'static str> = COMMON_FLAGS.iter().chain(specific).copied().collect();
    keys.sort_unstable();
    keys
}
