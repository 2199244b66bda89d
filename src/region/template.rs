use std::collections::HashMap;

use crate::error::RegionError;

/// Expands a region-formula template across repeated structural indices
/// (layers, sectors, waves) into plain signed-integer text for
/// [`super::Region::parse`].
///
/// A placeholder token has the form `[-]<local><name>[+<k>|-<k>]`, where
/// `<local>` is the digits of a block-local id and `<name>` is a key of
/// the index table. It expands to
/// `sign * (base + (table[name] + k) * stride + local)`, so one template
/// authored once serves every layer of a layered structure. Plain signed
/// integers, parentheses and `:` pass through unchanged.
///
/// Expansion is a pure function of the template and the index table, so a
/// template is safely reusable across sibling structures.
#[derive(Debug, Clone)]
pub struct CompositeTemplate {
    base: i64,
    stride: i64,
}

impl CompositeTemplate {
    /// Creates a template expander with the given block base and
    /// per-index stride.
    #[must_use]
    pub fn new(base: i64, stride: i64) -> Self {
        Self { base, stride }
    }

    /// Returns the block base.
    #[must_use]
    pub fn base(&self) -> i64 {
        self.base
    }

    /// Returns the per-index stride.
    #[must_use]
    pub fn stride(&self) -> i64 {
        self.stride
    }

    /// Expands `template` against `indices`, producing parseable region
    /// text.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::UnknownPlaceholder`] when a placeholder
    /// names a missing index (an authoring bug, fatal for this
    /// expansion), or [`RegionError::Malformed`] on an unparseable token.
    pub fn expand(
        &self,
        template: &str,
        indices: &HashMap<String, i64>,
    ) -> Result<String, RegionError> {
        let mut out: Vec<String> = Vec::new();
        let mut chars = template.chars().peekable();
        while let Some(&c) = chars.peek() {
            match c {
                c if c.is_whitespace() => {
                    chars.next();
                }
                '(' | ')' | ':' => {
                    out.push(c.to_string());
                    chars.next();
                }
                _ => {
                    let mut word = String::new();
                    while let Some(&d) = chars.peek() {
                        if d.is_whitespace() || d == '(' || d == ')' || d == ':' {
                            break;
                        }
                        word.push(d);
                        chars.next();
                    }
                    out.push(self.expand_token(&word, indices)?);
                }
            }
        }
        Ok(out.join(" "))
    }

    fn expand_token(
        &self,
        token: &str,
        indices: &HashMap<String, i64>,
    ) -> Result<String, RegionError> {
        let mut rest = token;
        let negative = if let Some(stripped) = rest.strip_prefix('-') {
            rest = stripped;
            true
        } else {
            false
        };

        let digits_len = rest.chars().take_while(char::is_ascii_digit).count();
        if digits_len == 0 {
            return Err(RegionError::Malformed(format!(
                "bad template token '{token}'"
            )));
        }
        let local: i64 = rest[..digits_len]
            .parse()
            .map_err(|_| RegionError::Malformed(format!("bad template token '{token}'")))?;
        rest = &rest[digits_len..];

        // No placeholder name: a plain literal passes through as written.
        if rest.is_empty() {
            return Ok(token.to_string());
        }

        let name_len = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .count();
        let name = &rest[..name_len];
        rest = &rest[name_len..];
        if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
            return Err(RegionError::Malformed(format!(
                "bad template token '{token}'"
            )));
        }

        let adjust: i64 = if rest.is_empty() {
            0
        } else {
            rest.parse().map_err(|_| {
                RegionError::Malformed(format!("bad placeholder offset in '{token}'"))
            })?
        };

        let index = indices
            .get(name)
            .ok_or_else(|| RegionError::UnknownPlaceholder(name.to_string()))?;

        let value = self.base + (index + adjust) * self.stride + local;
        let signed = if negative { -value } else { value };
        Ok(signed.to_string())
    }
}
