//! Word classification for condition sentences.

use super::comparator::Relation;
use super::conjunction::Junction;
use super::error::ConditionError;
use super::terminal::Terminal;
use std::fmt;

/// A classified word of a condition sentence.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Comparator(Relation),
    Conjunction(Junction),
    Terminal(Terminal),
}

impl Token {
    /// Classify one word: comparator, then conjunction, then terminal.
    pub fn classify(word: &str) -> Option<Self> {
        if let Some(relation) = Relation::from_word(word) {
            return Some(Self::Comparator(relation));
        }
        if let Some(junction) = Junction::from_word(word) {
            return Some(Self::Conjunction(junction));
        }
        Terminal::parse(word).map(Self::Terminal)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comparator(relation) => write!(f, "{}", relation),
            Self::Conjunction(junction) => write!(f, "{}", junction),
            Self::Terminal(terminal) => write!(f, "{}", terminal),
        }
    }
}

/// Split a sentence on whitespace and classify every word.
pub fn tokenize(sentence: &str) -> Result<Vec<Token>, ConditionError> {
    sentence
        .split_whitespace()
        .enumerate()
        .map(|(position, word)| {
            Token::classify(word).ok_or_else(|| ConditionError::InvalidToken {
                position,
                token: word.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Value;

    #[test]
    fn classify_words() {
        assert_eq!(
            Token::classify(">="),
            Some(Token::Comparator(Relation::GreaterOrEqual))
        );
        assert_eq!(
            Token::classify("AND"),
            Some(Token::Conjunction(Junction::And))
        );
        assert_eq!(
            Token::classify("||"),
            Some(Token::Conjunction(Junction::Or))
        );
        assert_eq!(
            Token::classify("5"),
            Some(Token::Terminal(Terminal::literal(Value::Number(5.0))))
        );
        assert_eq!(
            Token::classify("mood"),
            Some(Token::Terminal(Terminal::item("mood")))
        );
    }

    #[test]
    fn tokenize_collapses_whitespace() {
        let tokens = tokenize("  a   >=\t5\nand b = true ").unwrap_or_default();
        assert_eq!(tokens.len(), 7);
    }

    #[test]
    fn tokenize_reports_invalid_word() {
        assert_eq!(
            tokenize("a = (5)"),
            Err(ConditionError::InvalidToken {
                position: 2,
                token: "(5)".to_string(),
            })
        );
    }
}
