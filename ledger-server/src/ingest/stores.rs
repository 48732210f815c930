use super::schema::StoreAlias;

/// Canonical store id for free-form `raw`
///
/// The first alias group with an alias contained in `raw` wins; anything
/// else passes through trimmed and lowercased.
pub fn normalize_store(raw: &str, aliases: &[StoreAlias]) -> String {
    let text = raw.trim().to_lowercase();
    if text.is_empty() {
        return text;
    }
    aliases
        .iter()
        .find(|group| {
            group
                .aliases
                .iter()
                .map(|a| a.trim().to_lowercase())
                .any(|a| !a.is_empty() && text.contains(&a))
        })
        .map(|group| group.canonical.clone())
        .unwrap_or(text)
}
