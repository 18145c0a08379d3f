//! Custom property (`var()`) resolution.
//!
//! Resolution follows fallback chains and refuses to re-enter a variable that is
//! already being expanded, so every lookup terminates.

use crate::node::ComputedStyle;
use crate::parsers::{find_closing_paren, function_call_at, parse_var_arguments};
use std::collections::BTreeMap;
use thiserror::Error;

/// Custom properties by name (including the leading `--`).
pub type CustomProperties = BTreeMap<String, String>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VarError {
    #[error("custom property '{0}' is not defined and has no fallback")]
    Undefined(String),

    #[error("custom property '{0}' references itself")]
    Cycle(String),

    #[error("malformed var() reference: {0}")]
    Malformed(String),
}

/// Keeps only the `--*` entries of a computed style.
pub fn extract_custom_properties(style: &ComputedStyle) -> CustomProperties {
    style
        .iter()
        .filter(|(name, _)| name.starts_with("--"))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Names referenced by `var()` calls anywhere in `text`, including inside fallbacks.
pub fn referenced_variable_names(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    for (at, _) in text.char_indices() {
        let Some(open) = function_call_at(text, at, "var") else {
            continue;
        };
        if let Ok((_, (name, _))) = parse_var_arguments(&text[open + 1..]) {
            names.push(name.to_string());
        }
    }
    names
}

/// The variables visible from one node: its own computed custom properties first,
/// then whatever it inherited.
#[derive(Debug, Clone, Copy)]
pub struct VarScope<'a> {
    local: &'a ComputedStyle,
    inherited: &'a CustomProperties,
}

impl<'a> VarScope<'a> {
    pub fn new(local: &'a ComputedStyle, inherited: &'a CustomProperties) -> Self {
        Self { local, inherited }
    }

    pub fn lookup(&self, name: &str) -> Option<&'a str> {
        self.local
            .get(name)
            .or_else(|| self.inherited.get(name))
            .map(String::as_str)
    }

    /// Expands every `var()` in `text`.
    pub fn resolve(&self, text: &str) -> Result<String, VarError> {
        self.resolve_internal(text, &mut Vec::new())
    }

    fn resolve_internal(&self, text: &str, stack: &mut Vec<String>) -> Result<String, VarError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut cursor = 0;
        while cursor < text.len() {
            let Some(open) = function_call_at(text, cursor, "var") else {
                cursor += text[cursor..].chars().next().map_or(1, char::len_utf8);
                continue;
            };
            let close = find_closing_paren(text, open)
                .ok_or_else(|| VarError::Malformed(text[cursor..].to_string()))?;
            out.push_str(&text[last..cursor]);
            out.push_str(&self.resolve_single(&text[open + 1..close], stack)?);
            last = close + 1;
            cursor = close + 1;
        }
        out.push_str(&text[last..]);
        Ok(out)
    }

    fn resolve_single(&self, arguments: &str, stack: &mut Vec<String>) -> Result<String, VarError> {
        let (_, (name, fallback)) = parse_var_arguments(arguments)
            .map_err(|_| VarError::Malformed(format!("var({})", arguments)))?;

        let resolve_fallback = |stack: &mut Vec<String>, miss: VarError| match fallback {
            Some(fallback) => self.resolve_internal(fallback, stack),
            None => Err(miss),
        };

        if stack.iter().any(|seen| seen == name) {
            return resolve_fallback(stack, VarError::Cycle(name.to_string()));
        }

        match self.lookup(name) {
            Some(value) => {
                stack.push(name.to_string());
                let expanded = self.resolve_internal(value, stack);
                stack.pop();
                match expanded {
                    Ok(expanded) => Ok(expanded),
                    Err(err) => resolve_fallback(stack, err),
                }
            }
            None => resolve_fallback(stack, VarError::Undefined(name.to_string())),
        }
    }
}
