use serde::{Deserialize, Deserializer};
use unicode_normalization::UnicodeNormalization;

/// Normalizes a name by stripping surrounding whitespace and
/// decomposing it into Unicode Normalization Form D.
pub fn normalize_name(name: impl AsRef<str>) -> String {
    name.as_ref().trim().nfd().to_string()
}

/// Normalizes text for case-insensitive search: surrounding
/// whitespace stripped, decomposed into NFD, then lowercased. Both
/// the query and the candidate field go through this before matching.
pub fn normalize_query(text: impl AsRef<str>) -> String {
    normalize_name(text).to_lowercase()
}

/// Deserializes an optional `String` after running it through
/// `normalize_name`.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let o: Option<String> = Deserialize::deserialize(deserializer)?;
    Ok(o.map(normalize_name))
}
