use std::fmt;

use snapstrip_core::SnapError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    /// 1-based column of the first character.
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            column: start + 1,
        }
    }
}

/// Unit suffix attached to a numeric literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Percent,
    Px,
    Deg,
    Rad,
    Grad,
    Turn,
}

impl Unit {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "%" => Some(Unit::Percent),
            "px" => Some(Unit::Px),
            "deg" => Some(Unit::Deg),
            "rad" => Some(Unit::Rad),
            "grad" => Some(Unit::Grad),
            "turn" => Some(Unit::Turn),
            _ => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unit::Percent => "%",
            Unit::Px => "px",
            Unit::Deg => "deg",
            Unit::Rad => "rad",
            Unit::Grad => "grad",
            Unit::Turn => "turn",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    Number { value: f32, unit: Option<Unit> },
    LeftParen,
    RightParen,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(s) => write!(f, "{}", s),
            TokenKind::Number { value, unit } => match unit {
                Some(u) => write!(f, "{}{}", value, u),
                None => write!(f, "{}", value),
            },
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

pub struct Lexer {
    source: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, SnapError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn next_token(&mut self) -> Result<Token, SnapError> {
        self.skip_whitespace();

        let start = self.pos;
        let ch = match self.peek() {
            Some(ch) => ch,
            None => return Ok(Token::new(TokenKind::Eof, Span::new(start, start))),
        };

        let starts_number = |c: char, next: Option<char>| {
            c.is_ascii_digit()
                || (c == '.' && next.is_some_and(|n| n.is_ascii_digit()))
                || ((c == '-' || c == '+')
                    && next.is_some_and(|n| n.is_ascii_digit() || n == '.'))
        };

        let kind = match ch {
            '(' => {
                self.advance();
                TokenKind::LeftParen
            }
            ')' => {
                self.advance();
                TokenKind::RightParen
            }
            c if starts_number(c, self.peek_next()) => self.read_number(start)?,
            c if c.is_ascii_alphabetic() || c == '-' || c == '_' => {
                let ident = self.read_while(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
                TokenKind::Identifier(ident.to_ascii_lowercase())
            }
            _ => {
                return Err(SnapError::filter_syntax(
                    format!("unexpected character '{}'", ch),
                    start + 1,
                ));
            }
        };

        Ok(Token::new(kind, Span::new(start, self.pos)))
    }

    fn read_number(&mut self, start: usize) -> Result<TokenKind, SnapError> {
        let mut literal = String::new();
        if let Some(sign @ ('-' | '+')) = self.peek() {
            literal.push(sign);
            self.advance();
        }
        literal.push_str(&self.read_while(|c| c.is_ascii_digit() || c == '.'));
        let value = literal.parse::<f32>().map_err(|_| {
            SnapError::filter_syntax(format!("invalid number '{}'", literal), start + 1)
        })?;

        let suffix = if self.peek() == Some('%') {
            self.advance();
            "%".to_string()
        } else {
            self.read_while(|c| c.is_ascii_alphabetic()).to_ascii_lowercase()
        };
        let unit = if suffix.is_empty() {
            None
        } else {
            Some(Unit::from_suffix(&suffix).ok_or_else(|| {
                SnapError::filter_syntax(format!("unknown unit '{}'", suffix), start + 1)
            })?)
        };
        Ok(TokenKind::Number { value, unit })
    }

    fn read_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut result = String::new();
        while let Some(ch) = self.peek() {
            if predicate(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_tokenize_function_with_percent() {
        assert_eq!(
            kinds("grayscale(100%)"),
            vec![
                TokenKind::Identifier("grayscale".into()),
                TokenKind::LeftParen,
                TokenKind::Number {
                    value: 100.0,
                    unit: Some(Unit::Percent)
                },
                TokenKind::RightParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_hyphenated_ident_and_negative_angle() {
        let k = kinds("HUE-ROTATE(-90deg)");
        assert_eq!(k[0], TokenKind::Identifier("hue-rotate".into()));
        assert_eq!(
            k[2],
            TokenKind::Number {
                value: -90.0,
                unit: Some(Unit::Deg)
            }
        );
    }

    #[test]
    fn test_tokenize_unknown_unit() {
        let err = Lexer::new("blur(2em)").tokenize().unwrap_err();
        assert!(err.to_string().contains("unknown unit 'em'"));
    }

    #[test]
    fn test_tokenize_unexpected_character() {
        let err = Lexer::new("sepia(1) ; blur(1px)").tokenize().unwrap_err();
        assert!(err.to_string().contains("column 10"));
    }
}
