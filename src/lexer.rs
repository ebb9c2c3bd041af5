//! Source scanning.
//!
//! Only the eight command symbols `><+-.,[]` carry meaning. Everything else,
//! including whitespace and newlines, is a comment and is dropped here.

use std::fmt;

/// One of the eight commands of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// `>`: move the tape pointer one cell to the right
    MoveRight,
    /// `<`: move the tape pointer one cell to the left
    MoveLeft,
    /// `+`: increment the current cell
    Increment,
    /// `-`: decrement the current cell
    Decrement,
    /// `.`: write the current cell to the output
    Output,
    /// `,`: read one character into the current cell
    Input,
    /// `[`: enter the loop body if the current cell is non-zero
    LoopOpen,
    /// `]`: end of the innermost loop body
    LoopClose,
}

impl Token {
    /// Map a source character to its command, if it is one.
    pub fn from_char(ch: char) -> Option<Token> {
        match ch {
            '>' => Some(Token::MoveRight),
            '<' => Some(Token::MoveLeft),
            '+' => Some(Token::Increment),
            '-' => Some(Token::Decrement),
            '.' => Some(Token::Output),
            ',' => Some(Token::Input),
            '[' => Some(Token::LoopOpen),
            ']' => Some(Token::LoopClose),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Token::MoveRight => '>',
            Token::MoveLeft => '<',
            Token::Increment => '+',
            Token::Decrement => '-',
            Token::Output => '.',
            Token::Input => ',',
            Token::LoopOpen => '[',
            Token::LoopClose => ']',
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Tokens in source order.
///
/// Each token remembers the character offset of its symbol so that parse
/// errors can point back into the original text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
    offsets: Vec<usize>,
}

impl TokenStream {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Iterate `(char offset, token)` pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Token)> + '_ {
        self.offsets.iter().copied().zip(self.tokens.iter().copied())
    }

    fn push(&mut self, offset: usize, token: Token) {
        self.tokens.push(token);
        self.offsets.push(offset);
    }
}

impl fmt::Display for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

/// Scan `source` into a token stream. Never fails.
pub fn tokenize(source: &str) -> TokenStream {
    let mut stream = TokenStream::default();
    for (offset, ch) in source.chars().enumerate() {
        if let Some(token) = Token::from_char(ch) {
            stream.push(offset, token);
        }
    }
    tracing::debug!(tokens = stream.len(), "lexed source");
    stream
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_all_eight_symbols_in_order() {
        let stream = tokenize("><+-.,[]");
        assert_eq!(
            stream.tokens(),
            &[
                Token::MoveRight,
                Token::MoveLeft,
                Token::Increment,
                Token::Decrement,
                Token::Output,
                Token::Input,
                Token::LoopOpen,
                Token::LoopClose,
            ]
        );
    }

    #[test]
    fn comments_are_dropped_but_offsets_are_kept() {
        let stream = tokenize("a+ b\n-");
        let pairs: Vec<_> = stream.iter().collect();
        assert_eq!(pairs, vec![(1, Token::Increment), (5, Token::Decrement)]);
    }

    #[test]
    fn offsets_count_chars_not_bytes() {
        let stream = tokenize("é+");
        assert_eq!(stream.iter().next(), Some((1, Token::Increment)));
    }

    #[test]
    fn comment_only_source_is_empty() {
        assert!(tokenize("hello world\n").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn display_round_trips_the_commands() {
        assert_eq!(tokenize("x[->+<]y.").to_string(), "[->+<].");
    }
}
