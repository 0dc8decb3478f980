//! Tokenization layer — splitting a user's reply into word tokens.
//!
//! The matcher only ever sees tokens, never raw text. Each token keeps both
//! the original surface form (which becomes the bound literal, so casing
//! survives into rendered lines) and a lowercased form used for ontology
//! lookups.

/// A single token extracted from input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token's text value, lowercased for lookup.
    pub value: String,
    /// The original text with edge punctuation removed.
    pub original: String,
    /// Zero-based position in the token sequence.
    pub position: usize,
}

impl Token {
    pub fn new(original: impl Into<String>, position: usize) -> Self {
        let original = original.into();
        Token {
            value: original.to_lowercase(),
            original,
            position,
        }
    }
}

/// Splits text into an order-preserving sequence of word tokens.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// The default tokenizer: whitespace separated words with leading and
/// trailing punctuation stripped.
///
/// Inner punctuation is kept so that contractions ("don't") and
/// hyphenated words ("well-known") stay a single token.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();

        for word in text.split_whitespace() {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric());
            if word.is_empty() {
                continue;
            }
            tokens.push(Token::new(word, tokens.len()));
        }

        tokens
    }
}

/// Tokenize with the default [`WordTokenizer`].
pub fn tokenize(text: &str) -> Vec<Token> {
    WordTokenizer.tokenize(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.value.as_str()).collect()
    }

    #[test]
    fn tokenize_simple_reply() {
        let tokens = tokenize("I have a cat named Rex");
        assert_eq!(values(&tokens), vec!["i", "have", "a", "cat", "named", "rex"]);
        assert_eq!(tokens[5].position, 5);
    }

    #[test]
    fn tokenize_preserves_original_case() {
        let tokens = tokenize("Rex");
        assert_eq!(tokens[0].value, "rex");
        assert_eq!(tokens[0].original, "Rex");
    }

    #[test]
    fn tokenize_strips_edge_punctuation() {
        let tokens = tokenize("  \"Rex!\"  it's a dog... ?");
        assert_eq!(
            tokens.iter().map(|t| t.original.as_str()).collect::<Vec<_>>(),
            vec!["Rex", "it's", "a", "dog"]
        );
        assert_eq!(tokens[3].position, 3);
    }

    #[test]
    fn tokenize_empty_input() {
        assert!(tokenize("   ").is_empty());
        assert!(tokenize("?!").is_empty());
    }
}
