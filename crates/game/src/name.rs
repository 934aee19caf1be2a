//! Display name normalization.

/// Characters that never make it into an install directory name.
const DISALLOWED_DIR_CHARS: &[char] = &[
    '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '[', ']', '{', '}', '"', '\'', '<', '>',
    ',', ';', ':', '|', '?', '\\', '/', '`', '~', '+', '=',
];

/// Folds a display name into its identity: lowercase ASCII letters and digits only.
///
/// Names made only of punctuation or whitespace normalize to the empty string.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Compares two display names by normalized containment.
///
/// Two empty identities match each other but nothing else. Otherwise one
/// normalized name must contain the other, so "Leisure Suit Larry" matches
/// "Leisure Suit Larry 1 - In the Land of the Lounge Lizards".
///
/// This relation is symmetric but not transitive.
pub fn names_match(a: &str, b: &str) -> bool {
    let a = normalize(a);
    let b = normalize(b);

    if a.is_empty() || b.is_empty() {
        return a == b;
    }

    a.contains(&b) || b.contains(&a)
}

/// Derives a filesystem-safe folder name from a display name.
///
/// Control characters and the disallowed punctuation set are dropped, then
/// whitespace runs collapse to a single space.
pub fn install_directory_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && !DISALLOWED_DIR_CHARS.contains(c))
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes every whitespace character from a display name.
pub fn stripped_name(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}
