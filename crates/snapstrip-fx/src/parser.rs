use snapstrip_core::SnapError;

use crate::ast::{FilterChain, FilterOp};
use crate::lexer::{Token, TokenKind, Unit};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// `none` | function+
    pub fn parse(&mut self) -> Result<FilterChain, SnapError> {
        if self.at_eof() {
            return Ok(FilterChain::none());
        }
        if let Some(TokenKind::Identifier(name)) = self.peek().map(|t| &t.kind) {
            if name == "none" {
                self.advance();
                self.expect_eof()?;
                return Ok(FilterChain::none());
            }
        }

        let mut ops = Vec::new();
        while !self.at_eof() {
            ops.push(self.parse_function()?);
        }
        Ok(FilterChain::new(ops))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn at_eof(&self) -> bool {
        self.peek().map_or(true, |t| t.kind == TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn column(&self) -> usize {
        self.peek().map_or(1, |t| t.span.column)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, SnapError> {
        let column = self.column();
        let token = self
            .advance()
            .ok_or_else(|| SnapError::filter_syntax("unexpected end of input", column))?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(SnapError::filter_syntax(
                format!("expected '{}', found '{}'", kind, token.kind),
                token.span.column,
            ))
        }
    }

    fn expect_eof(&mut self) -> Result<(), SnapError> {
        match self.peek() {
            Some(t) if t.kind != TokenKind::Eof => Err(SnapError::filter_syntax(
                format!("'none' cannot be combined with '{}'", t.kind),
                t.span.column,
            )),
            _ => Ok(()),
        }
    }

    fn parse_function(&mut self) -> Result<FilterOp, SnapError> {
        let column = self.column();
        let name_token = self
            .advance()
            .ok_or_else(|| SnapError::filter_syntax("expected filter function", column))?;
        let name = match name_token.kind {
            TokenKind::Identifier(name) => name,
            other => {
                return Err(SnapError::filter_syntax(
                    format!("expected filter function, found '{}'", other),
                    name_token.span.column,
                ))
            }
        };

        self.expect(TokenKind::LeftParen)?;
        let arg = match self.peek().map(|t| t.kind.clone()) {
            Some(TokenKind::Number { value, unit }) => {
                let column = self.column();
                self.advance();
                Some((value, unit, column))
            }
            _ => None,
        };
        self.expect(TokenKind::RightParen)?;

        build_op(&name, arg, name_token.span.column)
    }
}

/// Validate the argument of `name` and normalize it into a [`FilterOp`].
fn build_op(
    name: &str,
    arg: Option<(f32, Option<Unit>, usize)>,
    column: usize,
) -> Result<FilterOp, SnapError> {
    let amount = |default: f32| -> Result<f32, SnapError> {
        match arg {
            None => Ok(default),
            Some((v, _, col)) if v < 0.0 => Err(SnapError::filter_syntax(
                format!("{}() does not accept negative values", name),
                col,
            )),
            Some((v, None, _)) => Ok(v),
            Some((v, Some(Unit::Percent), _)) => Ok(v / 100.0),
            Some((_, Some(unit), col)) => Err(SnapError::filter_syntax(
                format!("{}() expects a number or percentage, found unit '{}'", name, unit),
                col,
            )),
        }
    };
    // Amount primitives whose effect saturates at 100%.
    let capped = |default: f32| amount(default).map(|a| a.min(1.0));

    let op = match name {
        "grayscale" => FilterOp::Grayscale(capped(1.0)?),
        "sepia" => FilterOp::Sepia(capped(1.0)?),
        "invert" => FilterOp::Invert(capped(1.0)?),
        "opacity" => FilterOp::Opacity(capped(1.0)?),
        "saturate" => FilterOp::Saturate(amount(1.0)?),
        "brightness" => FilterOp::Brightness(amount(1.0)?),
        "contrast" => FilterOp::Contrast(amount(1.0)?),
        "hue-rotate" => FilterOp::HueRotate(match arg {
            None => 0.0,
            Some((v, Some(Unit::Deg), _)) => v,
            Some((v, Some(Unit::Rad), _)) => v.to_degrees(),
            Some((v, Some(Unit::Grad), _)) => v * 0.9,
            Some((v, Some(Unit::Turn), _)) => v * 360.0,
            Some((v, None, _)) if v == 0.0 => 0.0,
            Some((_, _, col)) => {
                return Err(SnapError::filter_syntax(
                    "hue-rotate() expects an angle (deg, rad, grad, turn)",
                    col,
                ))
            }
        }),
        "blur" => FilterOp::Blur(match arg {
            None => 0.0,
            Some((v, _, col)) if v < 0.0 => {
                return Err(SnapError::filter_syntax(
                    "blur() does not accept negative values",
                    col,
                ))
            }
            Some((v, Some(Unit::Px), _)) => v,
            Some((v, None, _)) if v == 0.0 => 0.0,
            Some((_, _, col)) => {
                return Err(SnapError::filter_syntax("blur() expects a length in px", col))
            }
        }),
        other => {
            return Err(SnapError::filter_syntax(
                format!("unknown filter function '{}'", other),
                column,
            ))
        }
    };
    Ok(op)
}

#[cfg(test)]
mod tests {
    use crate::ast::FilterOp;
    use crate::parse;

    #[test]
    fn test_parse_percent_and_plain_amounts() {
        let chain = parse("grayscale(100%) brightness(1.2) contrast(150%)").unwrap();
        assert_eq!(
            chain.ops(),
            &[
                FilterOp::Grayscale(1.0),
                FilterOp::Brightness(1.2),
                FilterOp::Contrast(1.5),
            ]
        );
    }

    #[test]
    fn test_parse_defaults_and_caps() {
        let chain = parse("sepia() invert(250%) saturate(300%)").unwrap();
        assert_eq!(
            chain.ops(),
            &[FilterOp::Sepia(1.0), FilterOp::Invert(1.0), FilterOp::Saturate(3.0)]
        );
    }

    #[test]
    fn test_parse_angles_and_lengths() {
        let chain = parse("hue-rotate(0.5turn) blur(3px) hue-rotate(0)").unwrap();
        assert_eq!(
            chain.ops(),
            &[FilterOp::HueRotate(180.0), FilterOp::Blur(3.0), FilterOp::HueRotate(0.0)]
        );
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(parse("GrayScale(50%)").unwrap().ops(), &[FilterOp::Grayscale(0.5)]);
    }

    #[test]
    fn test_rejects_unknown_function() {
        let err = parse("sepia(1) glow(2)").unwrap_err();
        assert!(err.to_string().contains("unknown filter function 'glow'"));
        assert!(err.to_string().contains("column 10"));
    }

    #[test]
    fn test_rejects_bad_units_and_signs() {
        assert!(parse("blur(2%)").is_err());
        assert!(parse("blur(2)").is_err());
        assert!(parse("grayscale(10px)").is_err());
        assert!(parse("contrast(-1)").is_err());
        assert!(parse("hue-rotate(90)").is_err());
    }

    #[test]
    fn test_rejects_malformed_syntax() {
        assert!(parse("sepia(1").is_err());
        assert!(parse("sepia 1").is_err());
        assert!(parse("none sepia(1)").is_err());
    }
}
