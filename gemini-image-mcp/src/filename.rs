//! Filename synthesis for generated images.
//!
//! Names look like `red_fox_snowy_forest_3f9a0c1b7e42.png`: up to five
//! keywords from the prompt followed by a random 12-hex-digit suffix.

use uuid::Uuid;

use crate::format::ImageFormat;

/// Maximum number of prompt keywords kept in a name.
pub const MAX_KEYWORDS: usize = 5;

/// Maximum length of the stem (everything before the extension).
pub const MAX_STEM_LEN: usize = 100;

/// Number of hex digits in the uniqueness suffix (48 bits).
pub const SUFFIX_LEN: usize = 12;

/// Prefix used when the prompt yields no keywords.
pub const FALLBACK_PREFIX: &str = "image";

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "against", "all", "an", "and", "any", "are", "around", "as",
    "at", "be", "behind", "below", "beside", "between", "but", "by", "can", "could", "create",
    "do", "draw", "for", "from", "generate", "give", "has", "have", "her", "his", "how", "i",
    "image", "in", "into", "is", "it", "its", "like", "make", "me", "my", "near", "of", "off",
    "on", "onto", "or", "our", "out", "over", "picture", "please", "show", "some", "that", "the",
    "their", "them", "there", "these", "this", "those", "through", "to", "under", "up", "very",
    "was", "we", "were", "what", "which", "while", "with", "without", "would", "you", "your",
];

/// Derive a filesystem-safe name for an image generated from `prompt`.
///
/// The keyword part is deterministic for a given prompt; only the suffix is
/// random. The result never contains path separators and is never empty.
pub fn synthesize(prompt: &str, format: ImageFormat) -> String {
    format!("{}.{}", synthesize_stem(prompt), format.extension())
}

fn synthesize_stem(prompt: &str) -> String {
    let mut prefix = keywords(prompt).join("_");
    if prefix.is_empty() {
        prefix = FALLBACK_PREFIX.to_string();
    }

    // Keywords are ASCII, so byte truncation stays on a char boundary.
    let max_prefix = MAX_STEM_LEN - SUFFIX_LEN - 1;
    if prefix.len() > max_prefix {
        prefix.truncate(max_prefix);
        let trimmed = prefix.trim_end_matches('_').len();
        prefix.truncate(trimmed);
    }

    format!("{}_{}", prefix, random_suffix())
}

/// Lowercase ASCII keywords of a prompt, stopwords and single characters removed.
pub fn keywords(prompt: &str) -> Vec<String> {
    prompt
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| token.len() > 1 && !STOPWORDS.contains(token))
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

fn random_suffix() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    simple[simple.len() - SUFFIX_LEN..].to_string()
}
