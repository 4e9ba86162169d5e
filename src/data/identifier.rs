/// Lowercase the identifier and drop everything that is not alphanumeric.
pub fn normalize(id: &str) -> String {
    id.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// An identifier is well-formed when its normalized form reads the same in
/// both directions. Empty and single-character identifiers pass.
pub fn is_valid_identifier(id: &str) -> bool {
    let normalized: Vec<char> = normalize(id).chars().collect();
    normalized.iter().eq(normalized.iter().rev())
}
