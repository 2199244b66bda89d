use crate::error::RegionError;
use crate::registry::Handle;

use super::Region;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Literal(i64),
    Colon,
    Open,
    Close,
}

fn tokenize(text: &str) -> Result<Vec<Token>, RegionError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                tokens.push(Token::Open);
                chars.next();
            }
            ')' => {
                tokens.push(Token::Close);
                chars.next();
            }
            ':' => {
                tokens.push(Token::Colon);
                chars.next();
            }
            '-' | '0'..='9' => {
                let mut word = String::new();
                if c == '-' {
                    word.push(c);
                    chars.next();
                }
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        word.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value: i64 = word
                    .parse()
                    .map_err(|_| RegionError::Malformed(format!("bad literal '{word}'")))?;
                tokens.push(Token::Literal(value));
            }
            other => {
                return Err(RegionError::Malformed(format!(
                    "unexpected character '{other}'"
                )));
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    map: &'a dyn Fn(i64) -> i64,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    // union := intersection (':' intersection)*
    fn union(&mut self) -> Result<Region, RegionError> {
        let mut terms = vec![self.intersection()?];
        while self.peek() == Some(Token::Colon) {
            self.pos += 1;
            terms.push(self.intersection()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Region::Or(terms)
        })
    }

    // intersection := (literal | '(' union ')')+
    fn intersection(&mut self) -> Result<Region, RegionError> {
        let mut factors = Vec::new();
        loop {
            match self.peek() {
                Some(Token::Literal(raw)) => {
                    self.pos += 1;
                    factors.push(self.literal(raw)?);
                }
                Some(Token::Open) => {
                    self.pos += 1;
                    let inner = self.union()?;
                    if self.peek() != Some(Token::Close) {
                        return Err(RegionError::Malformed("missing ')'".into()));
                    }
                    self.pos += 1;
                    factors.push(inner);
                }
                _ => break,
            }
        }
        match factors.len() {
            0 => Err(RegionError::Malformed(
                "expected a literal or group".into(),
            )),
            1 => Ok(factors.remove(0)),
            _ => Ok(Region::And(factors)),
        }
    }

    fn literal(&self, raw: i64) -> Result<Region, RegionError> {
        if raw == 0 {
            return Err(RegionError::Malformed("0 is not a surface handle".into()));
        }
        let mapped = (self.map)(raw.abs());
        if mapped <= 0 {
            return Err(RegionError::Malformed(format!(
                "literal {raw} mapped to non-positive magnitude {mapped}"
            )));
        }
        let signed = if raw < 0 { -mapped } else { mapped };
        Handle::new(signed)
            .map(Region::Literal)
            .ok_or_else(|| RegionError::Malformed(format!("invalid handle {raw}")))
    }
}

pub(super) fn parse(text: &str, map: &dyn Fn(i64) -> i64) -> Result<Region, RegionError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        map,
    };
    let region = parser.union()?;
    if parser.pos != tokens.len() {
        return Err(RegionError::Malformed("unbalanced ')'".into()));
    }
    Ok(region)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn h(value: i64) -> Handle {
        Handle::new(value).unwrap()
    }

    #[test]
    fn adjacency_is_intersection() {
        let r = Region::parse("1 -2 3").unwrap();
        match r {
            Region::And(children) => assert_eq!(children.len(), 3),
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn colon_binds_looser_than_adjacency() {
        let r = Region::parse("1 2 : 3 4").unwrap();
        match r {
            Region::Or(terms) => {
                assert_eq!(terms.len(), 2);
                assert!(matches!(&terms[0], Region::And(c) if c.len() == 2));
            }
            other => panic!("expected Or, got {other:?}"),
        }
    }

    #[test]
    fn parens_group() {
        let r = Region::parse("1 ( 2 : 3 )").unwrap();
        assert_eq!(r.literals(), vec![h(1), h(2), h(3)]);
        match r {
            Region::And(children) => assert!(matches!(&children[1], Region::Or(_))),
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn glued_parens_tokenize() {
        let r = Region::parse("1 (2:3)").unwrap();
        assert_eq!(r.literals(), vec![h(1), h(2), h(3)]);
    }

    #[test]
    fn single_literal_pass_through() {
        let r = Region::parse("  -7 ").unwrap();
        assert!(matches!(r, Region::Literal(handle) if handle == h(-7)));
    }

    #[test]
    fn malformed_inputs_rejected() {
        for text in [
            "",
            "(",
            ")",
            "1 (",
            "( 1",
            "1 )",
            ":",
            "1 :",
            ": 2",
            "1 : : 2",
            "( )",
            "0",
            "-",
            "1 x 2",
        ] {
            assert!(
                matches!(Region::parse(text), Err(RegionError::Malformed(_))),
                "'{text}' should be malformed"
            );
        }
    }

    #[test]
    fn mapped_magnitude_must_stay_positive() {
        let r = Region::parse_mapped("1", |m| m - 10);
        assert!(matches!(r, Err(RegionError::Malformed(_))));
    }
}
