//! Rewrites unsupported color functions into rasterizer-safe `rgb()` values.
//!
//! The normalizer is a pure tree transform: it reads a [`StyledNode`] subtree and
//! returns a new one. Every computed property and the inline style string are
//! scanned; occurrences of an unsupported function are resolved (including any
//! `var()` inside them), converted and spliced back in place. `var()` references
//! that resolve to an unsupported color are replaced by the converted color.
//! Conversion failures keep the original text and are reported, never raised.

use crate::color::{convert_to_rgb, ColorError, ColorFunctions};
use crate::node::StyledNode;
use crate::parsers::{find_closing_paren, function_call_at};
use crate::variables::{extract_custom_properties, CustomProperties, VarScope};
use folio_types::NodePath;
use log::{debug, warn};

/// Pseudo property name used in reports for the inline `style` attribute.
pub const INLINE_STYLE_PROPERTY: &str = "style";

/// A single expression that could not be converted and was left as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeWarning {
    pub path: NodePath,
    pub property: String,
    pub expression: String,
    pub reason: ColorError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizationReport {
    /// Number of occurrences that were replaced.
    pub rewrites: usize,
    pub warnings: Vec<NormalizeWarning>,
}

impl NormalizationReport {
    pub fn is_clean(&self) -> bool {
        self.rewrites == 0 && self.warnings.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub node: StyledNode,
    pub report: NormalizationReport,
}

/// Result of normalizing one value string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueOutcome {
    pub text: String,
    pub rewrites: usize,
    pub failures: Vec<(String, ColorError)>,
}

#[derive(Debug, Clone, Default)]
pub struct ColorSpaceNormalizer {
    functions: ColorFunctions,
}

impl ColorSpaceNormalizer {
    pub fn new(functions: ColorFunctions) -> Self {
        Self { functions }
    }

    pub fn functions(&self) -> &ColorFunctions {
        &self.functions
    }

    /// Normalizes a whole subtree. `inherited` holds the custom properties visible
    /// at the subtree root from outer scopes.
    pub fn normalize(&self, root: &StyledNode, inherited: &CustomProperties) -> Normalized {
        let mut report = NormalizationReport::default();
        let node = self.normalize_node(root, &NodePath::root(), inherited, &mut report);
        debug!(
            "Color normalization finished: {} rewrite(s), {} warning(s)",
            report.rewrites,
            report.warnings.len()
        );
        Normalized { node, report }
    }

    fn normalize_node(
        &self,
        node: &StyledNode,
        path: &NodePath,
        inherited: &CustomProperties,
        report: &mut NormalizationReport,
    ) -> StyledNode {
        let scope = VarScope::new(&node.computed, inherited);
        let mut normalized = node.clone_without_children();

        for (property, value) in normalized.computed.iter_mut() {
            self.apply(value, property, path, &scope, report);
        }
        if let Some(inline) = normalized.inline_style.as_mut() {
            self.apply(inline, INLINE_STYLE_PROPERTY, path, &scope, report);
        }

        let mut child_scope = inherited.clone();
        child_scope.extend(extract_custom_properties(&normalized.computed));
        for (index, child) in node.children.iter().enumerate() {
            let child = self.normalize_node(child, &path.child(index), &child_scope, report);
            normalized.children.push(child);
        }
        normalized
    }

    fn apply(
        &self,
        value: &mut String,
        property: &str,
        path: &NodePath,
        scope: &VarScope<'_>,
        report: &mut NormalizationReport,
    ) {
        if !self.needs_attention(value) {
            return;
        }
        let outcome = self.normalize_value(value, scope);
        for (expression, reason) in outcome.failures {
            warn!(
                "Leaving unconvertible color '{}' in '{}' at {}: {}",
                expression, property, path, reason
            );
            report.warnings.push(NormalizeWarning {
                path: path.clone(),
                property: property.to_string(),
                expression,
                reason,
            });
        }
        report.rewrites += outcome.rewrites;
        *value = outcome.text;
    }

    fn needs_attention(&self, value: &str) -> bool {
        self.functions.appears_in(value) || value.contains("var(")
    }

    fn unsupported_call_at(&self, text: &str, at: usize) -> Option<usize> {
        self.functions
            .names()
            .iter()
            .find_map(|name| function_call_at(text, at, name))
    }

    /// Normalizes one value string against a variable scope.
    pub fn normalize_value(&self, value: &str, scope: &VarScope<'_>) -> ValueOutcome {
        let mut outcome = ValueOutcome::default();
        let mut out = String::with_capacity(value.len());
        let mut last = 0;
        let mut cursor = 0;

        while cursor < value.len() {
            if let Some(open) = self.unsupported_call_at(value, cursor) {
                let Some(close) = find_closing_paren(value, open) else {
                    let tail = value[cursor..].to_string();
                    outcome.failures.push((tail.clone(), ColorError::Unbalanced(tail)));
                    break;
                };
                let expression = &value[cursor..=close];
                out.push_str(&value[last..cursor]);
                match scope
                    .resolve(expression)
                    .map_err(ColorError::from)
                    .and_then(|resolved| convert_to_rgb(&resolved))
                {
                    Ok(rgb) => {
                        out.push_str(&rgb);
                        outcome.rewrites += 1;
                    }
                    Err(reason) => {
                        out.push_str(expression);
                        outcome.failures.push((expression.to_string(), reason));
                    }
                }
                last = close + 1;
                cursor = close + 1;
                continue;
            }

            if let Some(open) = function_call_at(value, cursor, "var")
                && let Some(close) = find_closing_paren(value, open)
                && let Some(replacement) = self.indirect_replacement(&value[cursor..=close], scope)
            {
                out.push_str(&value[last..cursor]);
                match replacement {
                    Ok(inner) => {
                        out.push_str(&inner.text);
                        outcome.rewrites += inner.rewrites;
                    }
                    Err(failures) => {
                        out.push_str(&value[cursor..=close]);
                        outcome.failures.extend(failures);
                    }
                }
                last = close + 1;
                cursor = close + 1;
                continue;
            }

            cursor += value[cursor..].chars().next().map_or(1, char::len_utf8);
        }

        out.push_str(&value[last..]);
        outcome.text = out;
        outcome
    }

    /// For a `var()` reference whose resolved value contains an unsupported color,
    /// returns the normalized resolved text (or the failures that prevent it).
    /// `None` means the reference should be left alone.
    #[allow(clippy::type_complexity)]
    fn indirect_replacement(
        &self,
        reference: &str,
        scope: &VarScope<'_>,
    ) -> Option<Result<ValueOutcome, Vec<(String, ColorError)>>> {
        let resolved = scope.resolve(reference).ok()?;
        if !self.functions.appears_in(&resolved) {
            return None;
        }
        let inner = self.normalize_value(&resolved, scope);
        if inner.failures.is_empty() {
            Some(Ok(inner))
        } else {
            Some(Err(inner.failures))
        }
    }
}

impl StyledNode {
    fn clone_without_children(&self) -> StyledNode {
        StyledNode {
            tag: self.tag.clone(),
            attributes: self.attributes.clone(),
            computed: self.computed.clone(),
            inline_style: self.inline_style.clone(),
            layout: self.layout,
            content: self.content.clone(),
            children: Vec::with_capacity(self.children.len()),
        }
    }
}
