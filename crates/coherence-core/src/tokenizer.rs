/// Split text into lowercase whitespace-separated tokens.
///
/// Punctuation stays attached to its token. The lexical scorer matches by
/// substring, so "triste," and "triste" hit the same lexicon stem.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tokenize() {
        assert_eq!(tokenize("Hoje Estou Bem"), vec!["hoje", "estou", "bem"]);
    }

    #[test]
    fn test_punctuation_kept() {
        assert_eq!(tokenize("triste, muito."), vec!["triste,", "muito."]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_whitespace_only() {
        assert!(tokenize("   \t\n  ").is_empty());
    }

    #[test]
    fn test_unicode_lowercase() {
        assert_eq!(tokenize("ANGÚSTIA Ódio"), vec!["angústia", "ódio"]);
    }
}
