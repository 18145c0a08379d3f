//! Stylesheet text filtering applied by the rasterizer while it parses `<style>` nodes.
//!
//! Filters are handed to a single capture call and never installed globally.

use crate::parsers::find_closing_paren;
use std::fmt::Debug;

pub trait StylesheetFilter: Send + Sync + Debug {
    /// Returns the stylesheet text the rasterizer should parse instead of `css`.
    fn filter(&self, css: &str) -> String;

    fn name(&self) -> &str;
}

/// Drops at-rules the rasterizer's stylesheet parser chokes on.
///
/// Statement at-rules (`@layer base, components;`) are removed up to their `;`,
/// block at-rules (`@property --x { ... }`) up to their matching `}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRuleFilter {
    disallowed: Vec<String>,
}

impl Default for AtRuleFilter {
    fn default() -> Self {
        Self::new(["@property", "@layer"])
    }
}

impl AtRuleFilter {
    pub fn new<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let disallowed = rules
            .into_iter()
            .map(|rule| {
                let rule = rule.into().trim().to_ascii_lowercase();
                if rule.starts_with('@') { rule } else { format!("@{}", rule) }
            })
            .filter(|rule| rule.len() > 1)
            .collect();
        Self { disallowed }
    }

    pub fn disallowed(&self) -> &[String] {
        &self.disallowed
    }

    /// The first disallowed at-rule name appearing in `css`, matched on whole identifiers.
    pub fn first_disallowed(&self, css: &str) -> Option<&str> {
        css.match_indices('@')
            .find_map(|(at, _)| self.disallowed_at(css, at))
    }

    fn disallowed_at(&self, css: &str, at: usize) -> Option<&str> {
        self.disallowed
            .iter()
            .find(|rule| {
                css.get(at..at + rule.len())
                    .is_some_and(|candidate| candidate.eq_ignore_ascii_case(rule))
                    && !css[at + rule.len()..]
                        .chars()
                        .next()
                        .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_')
            })
            .map(String::as_str)
    }
}

/// Byte index just past the end of the at-rule starting at `start`.
fn at_rule_end(css: &str, start: usize) -> usize {
    let mut quote: Option<char> = None;
    for (offset, c) in css[start..].char_indices() {
        let index = start + offset;
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => {
                if let Some(close) = find_closing_paren(css, index) {
                    return at_rule_end(css, close + 1);
                }
                return css.len();
            }
            ';' => return index + 1,
            '{' => return block_end(css, index),
            _ => {}
        }
    }
    css.len()
}

fn block_end(css: &str, open: usize) -> usize {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (offset, c) in css[open..].char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return open + offset + 1;
                }
            }
            _ => {}
        }
    }
    css.len()
}

impl StylesheetFilter for AtRuleFilter {
    fn filter(&self, css: &str) -> String {
        if self.disallowed.is_empty() {
            return css.to_string();
        }
        let mut out = String::with_capacity(css.len());
        let mut last = 0;
        let mut cursor = 0;
        while cursor < css.len() {
            if css[cursor..].starts_with('@') && self.disallowed_at(css, cursor).is_some() {
                out.push_str(&css[last..cursor]);
                let end = at_rule_end(css, cursor);
                last = end;
                cursor = end;
                continue;
            }
            cursor += css[cursor..].chars().next().map_or(1, char::len_utf8);
        }
        out.push_str(&css[last..]);
        out
    }

    fn name(&self) -> &str {
        "at-rule-filter"
    }
}
