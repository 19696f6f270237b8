use crate::error::{Error, SyntaxReason};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    Character(char),
    UnionOperator,
    StarOperator,
    PlusOperator,
    QuestionOperator,
    LeftParen,
    /// `(?:`
    NonCapturingParen,
    RightParen,
    Empty,
}

/// Splits a pattern into tokens, each tagged with the byte position where it
/// starts. Once the input is exhausted every call yields `Token::Empty`
/// positioned at the end of the pattern.
#[derive(Debug)]
pub struct Lexer<'a> {
    input: std::iter::Peekable<std::str::CharIndices<'a>>,
    end: usize,
}

impl Lexer<'_> {
    pub fn new(string: &'_ str) -> Lexer<'_> {
        Lexer {
            input: string.char_indices().peekable(),
            end: string.len(),
        }
    }

    pub fn scan(&mut self) -> crate::Result<(usize, Token)> {
        let Some((position, char)) = self.input.next() else {
            return Ok((self.end, Token::Empty));
        };

        let token = match char {
            '\\' => Token::Character(self.escape(position)?),
            '|' => Token::UnionOperator,
            '(' => self.group_open(position)?,
            ')' => Token::RightParen,
            '*' => Token::StarOperator,
            '+' => Token::PlusOperator,
            '?' => Token::QuestionOperator,
            _ => Token::Character(char),
        };

        Ok((position, token))
    }

    fn escape(&mut self, position: usize) -> crate::Result<char> {
        match self.input.next() {
            None => Err(Error::syntax(position, SyntaxReason::TrailingBackslash)),
            Some((_, 'n')) => Ok('\n'),
            Some((_, 't')) => Ok('\t'),
            Some((_, 'r')) => Ok('\r'),
            Some((_, '0')) => Ok('\0'),
            Some((_, c)) if c.is_ascii_punctuation() => Ok(c),
            Some((_, c)) => Err(Error::syntax(position, SyntaxReason::InvalidEscape(c))),
        }
    }

    fn group_open(&mut self, position: usize) -> crate::Result<Token> {
        if self.input.next_if(|&(_, c)| c == '?').is_none() {
            return Ok(Token::LeftParen);
        }

        match self.input.next() {
            Some((_, ':')) => Ok(Token::NonCapturingParen),
            _ => Err(Error::syntax(position, SyntaxReason::UnsupportedGroup)),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Character(c) => write!(f, "{c}"),
            Token::UnionOperator => write!(f, "|"),
            Token::StarOperator => write!(f, "*"),
            Token::PlusOperator => write!(f, "+"),
            Token::QuestionOperator => write!(f, "?"),
            Token::LeftParen => write!(f, "("),
            Token::NonCapturingParen => write!(f, "(?:"),
            Token::RightParen => write!(f, ")"),
            Token::Empty => write!(f, "[empty]"),
        }
    }
}
