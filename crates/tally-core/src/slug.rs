//! URL slugs derived from titles and tag names.

/// Lowercase `text`, keep alphanumerics, and collapse every other run of
/// characters into a single `-`.
///
/// ```
/// use tally_core::slug::slugify;
///
/// assert_eq!(slugify("My new idea"), "my-new-idea");
/// assert_eq!(slugify("  Add Twitter integration!! "), "add-twitter-integration");
/// ```
pub fn slugify(text: &str) -> String {
  text
    .to_lowercase()
    .chars()
    .map(|ch| if ch.is_alphanumeric() { ch } else { '-' })
    .collect::<String>()
    .split('-')
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join("-")
}
