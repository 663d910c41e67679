//! Compound CSS selectors: `tag.class#id[attr][attr="v"][attr^="v"]`.

use crate::error::{DomError, DomResult};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
    Class(String),
    Id(String),
    HasAttr(String),
    AttrEquals(String, String),
    AttrPrefix(String, String),
}

/// A parsed compound selector. Combinators are not supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    conditions: Vec<Condition>,
}

impl Selector {
    pub fn parse(input: &str) -> DomResult<Self> {
        let src = input.trim();
        let invalid = || DomError::InvalidSelector(input.to_string());
        if src.is_empty() {
            return Err(invalid());
        }

        let chars: Vec<char> = src.chars().collect();
        let mut pos = 0;
        let mut tag = None;
        let mut conditions = Vec::new();

        let ident = |pos: &mut usize| -> String {
            let start = *pos;
            while *pos < chars.len() && is_ident_char(chars[*pos]) {
                *pos += 1;
            }
            chars[start..*pos].iter().collect()
        };

        if chars[0] == '*' {
            pos = 1;
        } else if is_ident_char(chars[0]) {
            tag = Some(ident(&mut pos).to_ascii_lowercase());
        }

        while pos < chars.len() {
            match chars[pos] {
                '.' => {
                    pos += 1;
                    let name = ident(&mut pos);
                    if name.is_empty() {
                        return Err(invalid());
                    }
                    conditions.push(Condition::Class(name));
                }
                '#' => {
                    pos += 1;
                    let name = ident(&mut pos);
                    if name.is_empty() {
                        return Err(invalid());
                    }
                    conditions.push(Condition::Id(name));
                }
                '[' => {
                    pos += 1;
                    let name = ident(&mut pos);
                    if name.is_empty() || pos >= chars.len() {
                        return Err(invalid());
                    }
                    let prefix = match chars[pos] {
                        ']' => {
                            pos += 1;
                            conditions.push(Condition::HasAttr(name));
                            continue;
                        }
                        '=' => false,
                        '^' if chars.get(pos + 1) == Some(&'=') => {
                            pos += 1;
                            true
                        }
                        _ => return Err(invalid()),
                    };
                    pos += 1;
                    let value = quoted_value(&chars, &mut pos).ok_or_else(invalid)?;
                    if chars.get(pos) != Some(&']') {
                        return Err(invalid());
                    }
                    pos += 1;
                    conditions.push(if prefix {
                        Condition::AttrPrefix(name, value)
                    } else {
                        Condition::AttrEquals(name, value)
                    });
                }
                _ => return Err(invalid()),
            }
        }

        Ok(Self { tag, conditions })
    }

    /// Whether an element with `tag` and `attrs` satisfies the selector.
    pub fn matches(&self, tag: &str, attrs: &[(String, String)]) -> bool {
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        let attr = |name: &str| {
            attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        };

        self.conditions.iter().all(|cond| match cond {
            Condition::Class(class) => attr("class")
                .map(|v| v.split_whitespace().any(|c| c == class))
                .unwrap_or(false),
            Condition::Id(id) => attr("id") == Some(id.as_str()),
            Condition::HasAttr(name) => attr(name).is_some(),
            Condition::AttrEquals(name, value) => attr(name) == Some(value.as_str()),
            Condition::AttrPrefix(name, value) => attr(name)
                .map(|v| v.starts_with(value.as_str()))
                .unwrap_or(false),
        })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn quoted_value(chars: &[char], pos: &mut usize) -> Option<String> {
    let quote = *chars.get(*pos)?;
    if quote != '"' && quote != '\'' {
        let start = *pos;
        while *pos < chars.len() && is_ident_char(chars[*pos]) {
            *pos += 1;
        }
        return (*pos > start).then(|| chars[start..*pos].iter().collect());
    }
    *pos += 1;
    let start = *pos;
    while *pos < chars.len() && chars[*pos] != quote {
        *pos += 1;
    }
    if *pos >= chars.len() {
        return None;
    }
    let value = chars[start..*pos].iter().collect();
    *pos += 1;
    Some(value)
}
