// Selector grammar understood here:
//   list      := complex ("," complex)*
//   complex   := compound ((" " | ">") compound)*
//   compound  := (tag | "*")? (".class" | "#id" | "[attr]" | "[attr=v]" | "[attr~=v]" | ":not(list)")*
//
// input:  ".midcol.unvoted > .score.unvoted, .search-score"
// output: Selector { alternatives: [Complex { .. }, Complex { .. }] }

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected {found:?} at byte {pos} in {input:?}")]
    Unexpected {
        input: String,
        pos: usize,
        found: char,
    },
    #[error("unterminated {what} in {input:?}")]
    Unterminated { input: String, what: &'static str },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrOp {
    Exists,
    Equals(String),
    /// `~=`: whitespace-separated list contains the value.
    Includes(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Simple {
    Id(String),
    Class(String),
    Attr { name: String, op: AttrOp },
    Not(Selector),
}

/// `tag.class#id[attr]:not(...)`: every part must match the same element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Compound {
    /// `None` for `*` or an omitted type.
    pub tag: Option<String>,
    pub parts: Vec<Simple>,
}

/// One comma-separated alternative, stored right to left. `ancestors[i].0`
/// joins `ancestors[i].1` to the compound on its right.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Complex {
    pub subject: Compound,
    pub ancestors: Vec<(Combinator, Compound)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    source: String,
    pub alternatives: Vec<Complex>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        };
        let alternatives = parser.list()?;
        parser.skip_ws();
        if let Some(found) = parser.peek_char() {
            return Err(parser.unexpected(found));
        }
        Ok(Self {
            source: input.trim().to_string(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_') || b >= 0x80
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn unexpected(&self, found: char) -> SelectorError {
        SelectorError::Unexpected {
            input: self.input.to_string(),
            pos: self.pos,
            found,
        }
    }

    fn unterminated(&self, what: &'static str) -> SelectorError {
        SelectorError::Unterminated {
            input: self.input.to_string(),
            what,
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_byte) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(match self.peek_char() {
                Some(c) => self.unexpected(c),
                None => self.unterminated("identifier"),
            });
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn list(&mut self) -> Result<Vec<Complex>, SelectorError> {
        let mut out = vec![self.complex()?];
        loop {
            self.skip_ws();
            if self.peek() != Some(b',') {
                return Ok(out);
            }
            self.pos += 1;
            out.push(self.complex()?);
        }
    }

    fn complex(&mut self) -> Result<Complex, SelectorError> {
        self.skip_ws();
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                Some(b'>') => {
                    self.pos += 1;
                    self.skip_ws();
                    Combinator::Child
                }
                Some(b',') | Some(b')') | None => break,
                Some(_) if had_ws => Combinator::Descendant,
                Some(_) => break,
            };
            combinators.push(combinator);
            compounds.push(self.compound()?);
        }
        let subject = compounds.pop().ok_or(SelectorError::Empty)?;
        let ancestors = combinators
            .into_iter()
            .rev()
            .zip(compounds.into_iter().rev())
            .collect();
        Ok(Complex { subject, ancestors })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let start = self.pos;
        match self.peek() {
            Some(b'*') => self.pos += 1,
            Some(b) if is_ident_byte(b) => compound.tag = Some(self.ident()?.to_ascii_lowercase()),
            _ => {}
        }
        loop {
            match self.peek() {
                Some(b'.') => {
                    self.pos += 1;
                    compound.parts.push(Simple::Class(self.ident()?));
                }
                Some(b'#') => {
                    self.pos += 1;
                    compound.parts.push(Simple::Id(self.ident()?));
                }
                Some(b'[') => {
                    self.pos += 1;
                    compound.parts.push(self.attribute()?);
                }
                Some(b':') => {
                    self.pos += 1;
                    let name = self.ident()?;
                    if !name.eq_ignore_ascii_case("not") || self.peek() != Some(b'(') {
                        return Err(self.unexpected(':'));
                    }
                    self.pos += 1;
                    let alternatives = self.list()?;
                    self.skip_ws();
                    if self.peek() != Some(b')') {
                        return Err(self.unterminated(":not()"));
                    }
                    self.pos += 1;
                    compound.parts.push(Simple::Not(Selector {
                        source: String::new(),
                        alternatives,
                    }));
                }
                _ => break,
            }
        }
        if self.pos == start {
            return Err(match self.peek_char() {
                Some(c) => self.unexpected(c),
                None => SelectorError::Empty,
            });
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<Simple, SelectorError> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();
        let op = match self.peek() {
            Some(b']') => {
                self.pos += 1;
                return Ok(Simple::Attr {
                    name,
                    op: AttrOp::Exists,
                });
            }
            Some(b'=') => {
                self.pos += 1;
                AttrOp::Equals(self.attr_value()?)
            }
            Some(b'~') if self.bytes.get(self.pos + 1) == Some(&b'=') => {
                self.pos += 2;
                AttrOp::Includes(self.attr_value()?)
            }
            Some(_) => return Err(self.unexpected(self.peek_char().unwrap_or(' '))),
            None => return Err(self.unterminated("attribute selector")),
        };
        self.skip_ws();
        if self.peek() != Some(b']') {
            return Err(self.unterminated("attribute selector"));
        }
        self.pos += 1;
        Ok(Simple::Attr { name, op })
    }

    fn attr_value(&mut self) -> Result<String, SelectorError> {
        self.skip_ws();
        match self.peek() {
            Some(q @ (b'"' | b'\'')) => {
                self.pos += 1;
                let rel = self.bytes[self.pos..]
                    .iter()
                    .position(|b| *b == q)
                    .ok_or_else(|| self.unterminated("quoted value"))?;
                let value = self.input[self.pos..self.pos + rel].to_string();
                self.pos += rel + 1;
                Ok(value)
            }
            _ => self.ident(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compound_with_child_combinator() {
        let sel = Selector::parse(".midcol.unvoted > .score.unvoted").unwrap();
        assert_eq!(sel.alternatives.len(), 1);
        let complex = &sel.alternatives[0];
        assert_eq!(
            complex.subject.parts,
            vec![
                Simple::Class("score".into()),
                Simple::Class("unvoted".into())
            ]
        );
        assert_eq!(complex.ancestors.len(), 1);
        assert_eq!(complex.ancestors[0].0, Combinator::Child);
    }

    #[test]
    fn parses_lists_and_not() {
        let sel = Selector::parse(".entry, .search-result-link > :not(.thumbnail)").unwrap();
        assert_eq!(sel.alternatives.len(), 2);
        let second = &sel.alternatives[1];
        assert!(matches!(&second.subject.parts[0], Simple::Not(inner) if inner.alternatives.len() == 1));
        assert_eq!(sel.to_string(), ".entry, .search-result-link > :not(.thumbnail)");
    }

    #[test]
    fn descendant_chain_is_right_to_left() {
        let sel = Selector::parse(".listing  .thing a.title").unwrap();
        let c = &sel.alternatives[0];
        assert_eq!(c.subject.tag.as_deref(), Some("a"));
        assert_eq!(c.ancestors[0].1.parts, vec![Simple::Class("thing".into())]);
        assert_eq!(c.ancestors[1].1.parts, vec![Simple::Class("listing".into())]);
    }

    #[test]
    fn parses_attribute_forms() {
        let sel = Selector::parse(r#"[data-name="res"][hidden][rel~=nofollow]"#).unwrap();
        assert_eq!(sel.alternatives[0].subject.parts.len(), 3);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse(".a >").is_err());
        assert!(Selector::parse(":hover").is_err());
        assert!(Selector::parse("[x").is_err());
        assert!(Selector::parse(".a )").is_err());
    }
}
