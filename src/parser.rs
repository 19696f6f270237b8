use crate::error::{Error, SyntaxReason};
use crate::lexer::{Lexer, Token};

/// Deepest group nesting the parser accepts.
pub const MAX_NESTING: usize = 250;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AstNode {
    Literal(char),
    Concat(Vec<AstNode>),
    Alternation(Box<AstNode>, Box<AstNode>),
    Star {
        inner: Box<AstNode>,
        greedy: bool,
    },
    Plus {
        inner: Box<AstNode>,
        greedy: bool,
    },
    Question {
        inner: Box<AstNode>,
        greedy: bool,
    },
    /// `capture` is `None` for `(?:...)`.
    Group {
        inner: Box<AstNode>,
        capture: Option<usize>,
    },
}

impl AstNode {
    /// Number of capturing groups in the tree.
    pub fn capture_count(&self) -> usize {
        match self {
            AstNode::Literal(_) => 0,
            AstNode::Concat(nodes) => nodes.iter().map(AstNode::capture_count).sum(),
            AstNode::Alternation(left, right) => left.capture_count() + right.capture_count(),
            AstNode::Star { inner, .. }
            | AstNode::Plus { inner, .. }
            | AstNode::Question { inner, .. } => inner.capture_count(),
            AstNode::Group { inner, capture } => {
                usize::from(capture.is_some()) + inner.capture_count()
            }
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, AstNode::Concat(nodes) if nodes.is_empty())
    }
}

#[derive(Debug)]
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    looking: Token,
    position: usize,
    captures: usize,
    depth: usize,
}

impl Parser<'_> {
    pub fn new(pattern: &str) -> crate::Result<Parser<'_>> {
        let mut lexer = Lexer::new(pattern);
        let (position, looking) = lexer.scan()?;

        Ok(Parser {
            lexer,
            looking,
            position,
            captures: 0,
            depth: 0,
        })
    }

    fn advance(&mut self) -> crate::Result<()> {
        (self.position, self.looking) = self.lexer.scan()?;
        Ok(())
    }

    fn error(&self, reason: SyntaxReason) -> Error {
        Error::syntax(self.position, reason)
    }

    pub fn parse(&mut self) -> crate::Result<AstNode> {
        let ast = self.parse_expr()?;

        // parse_expr only stops at the end of input or at a `)` that no
        // group is waiting for.
        if self.looking == Token::RightParen {
            return Err(self.error(SyntaxReason::UnmatchedRightParen));
        }

        Ok(ast)
    }

    fn parse_expr(&mut self) -> crate::Result<AstNode> {
        let first = self.parse_term()?;
        let mut rest = vec![];

        while self.looking == Token::UnionOperator {
            let bar = self.position;
            if first.is_empty() && rest.is_empty() {
                return Err(Error::syntax(bar, SyntaxReason::EmptyAlternative));
            }

            self.advance()?;
            let term = self.parse_term()?;
            if term.is_empty() {
                return Err(Error::syntax(bar, SyntaxReason::EmptyAlternative));
            }
            rest.push(term);
        }

        // a|b|c nests to the right: Alternation(a, Alternation(b, c))
        Ok(match rest.pop() {
            None => first,
            Some(last) => {
                let tail = rest.into_iter().rev().fold(last, |acc, alternative| {
                    AstNode::Alternation(Box::new(alternative), Box::new(acc))
                });
                AstNode::Alternation(Box::new(first), Box::new(tail))
            }
        })
    }

    fn parse_term(&mut self) -> crate::Result<AstNode> {
        let mut nodes = vec![];

        while let Some(node) = self.parse_factor()? {
            nodes.push(node);
        }

        if nodes.len() == 1
            && let Some(node) = nodes.pop()
        {
            return Ok(node);
        }

        Ok(AstNode::Concat(nodes))
    }

    /// Returns `None` at a token that ends the current term.
    fn parse_factor(&mut self) -> crate::Result<Option<AstNode>> {
        let Some(atom) = self.parse_atom()? else {
            return Ok(None);
        };
        let inner = Box::new(atom);

        let ast = match self.looking {
            Token::StarOperator => {
                self.advance()?;
                AstNode::Star {
                    inner,
                    greedy: self.greedy()?,
                }
            }
            Token::PlusOperator => {
                self.advance()?;
                AstNode::Plus {
                    inner,
                    greedy: self.greedy()?,
                }
            }
            Token::QuestionOperator => {
                self.advance()?;
                AstNode::Question {
                    inner,
                    greedy: self.greedy()?,
                }
            }
            _ => return Ok(Some(*inner)),
        };

        if let Some(quantifier) = quantifier(self.looking) {
            return Err(self.error(SyntaxReason::RepeatedQuantifier(quantifier)));
        }

        Ok(Some(ast))
    }

    /// Consumes the lazy `?` suffix of a quantifier, if present.
    fn greedy(&mut self) -> crate::Result<bool> {
        if self.looking == Token::QuestionOperator {
            self.advance()?;
            return Ok(false);
        }

        Ok(true)
    }

    fn parse_atom(&mut self) -> crate::Result<Option<AstNode>> {
        let atom = match self.looking {
            Token::Character(c) => {
                self.advance()?;
                AstNode::Literal(c)
            }
            Token::LeftParen => {
                // numbered when the paren is consumed, so outer groups come
                // before the groups they contain
                self.captures += 1;
                self.parse_group(Some(self.captures))?
            }
            Token::NonCapturingParen => self.parse_group(None)?,
            Token::StarOperator | Token::PlusOperator | Token::QuestionOperator => {
                let quantifier = quantifier(self.looking).unwrap_or('?');
                return Err(self.error(SyntaxReason::DanglingQuantifier(quantifier)));
            }
            Token::RightParen | Token::UnionOperator | Token::Empty => return Ok(None),
        };

        Ok(Some(atom))
    }

    fn parse_group(&mut self, capture: Option<usize>) -> crate::Result<AstNode> {
        let open = self.position;
        if self.depth >= MAX_NESTING {
            return Err(self.error(SyntaxReason::NestingTooDeep));
        }

        self.depth += 1;
        self.advance()?;
        let inner = self.parse_expr()?;

        if self.looking != Token::RightParen {
            return Err(Error::syntax(open, SyntaxReason::MissingRightParen));
        }
        self.advance()?;
        self.depth -= 1;

        Ok(AstNode::Group {
            inner: Box::new(inner),
            capture,
        })
    }
}

fn quantifier(token: Token) -> Option<char> {
    match token {
        Token::StarOperator => Some('*'),
        Token::PlusOperator => Some('+'),
        Token::QuestionOperator => Some('?'),
        _ => None,
    }
}

pub fn parse(pattern: &str) -> crate::Result<AstNode> {
    Parser::new(pattern)?.parse()
}
