//! Template compilation.
//!
//! A template is a string of literal text interleaved with `{category}`
//! placeholders, e.g. `"{意象}{建筑}"` or `"{prefix}·{noun}"`. Compilation
//! turns it into an ordered slot list and validates every placeholder against
//! the style's category names, so a run never discovers a bad reference
//! halfway through enumeration.

use std::collections::HashSet;

use crate::engine::error::EngineError;

/// One element of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Literal text copied into every candidate verbatim.
    Literal(String),
    /// A placeholder resolved to one root of the named category per candidate.
    Category(String),
}

/// A parsed and validated template.
///
/// Compilation is a pure function of its inputs: the same template string and
/// category set always produce the same slot list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
    source: String,
    slots: Vec<Slot>,
}

impl CompiledTemplate {
    /// Compile a template string against the set of known category names.
    ///
    /// # Errors
    /// - [`EngineError::MalformedTemplate`] on unbalanced braces or an empty
    ///   placeholder.
    /// - [`EngineError::UnknownCategory`] when a placeholder names a category
    ///   absent from `categories`.
    pub fn compile(template: &str, categories: &HashSet<String>) -> Result<Self, EngineError> {
        let mut slots = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars();

        while let Some(ch) = chars.next() {
            match ch {
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => {
                                return Err(EngineError::MalformedTemplate {
                                    template: template.to_string(),
                                    reason: "nested '{' inside placeholder".to_string(),
                                })
                            }
                            other => name.push(other),
                        }
                    }
                    if !closed {
                        return Err(EngineError::MalformedTemplate {
                            template: template.to_string(),
                            reason: "unclosed '{'".to_string(),
                        });
                    }
                    if name.is_empty() {
                        return Err(EngineError::MalformedTemplate {
                            template: template.to_string(),
                            reason: "empty placeholder".to_string(),
                        });
                    }
                    if !categories.contains(&name) {
                        return Err(EngineError::UnknownCategory {
                            template: template.to_string(),
                            category: name,
                        });
                    }
                    if !literal.is_empty() {
                        slots.push(Slot::Literal(std::mem::take(&mut literal)));
                    }
                    slots.push(Slot::Category(name));
                }
                '}' => {
                    return Err(EngineError::MalformedTemplate {
                        template: template.to_string(),
                        reason: "'}' without matching '{'".to_string(),
                    })
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            slots.push(Slot::Literal(literal));
        }

        Ok(Self {
            source: template.to_string(),
            slots,
        })
    }

    /// The original template string.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The ordered slot list.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Category names in slot order, one entry per category slot.
    ///
    /// A category repeated across slots appears once per occurrence; each
    /// occurrence is resolved independently during enumeration.
    pub fn category_refs(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Category(name) => Some(name.as_str()),
            Slot::Literal(_) => None,
        })
    }

    /// Concatenate the slots into a candidate, consuming one chosen root per
    /// category slot in order.
    ///
    /// `choices` must hold exactly as many entries as there are category
    /// slots; this is an internal contract of the combination generator.
    pub(crate) fn render(&self, choices: &[&str]) -> String {
        let mut next = 0usize;
        let mut out = String::new();
        for slot in &self.slots {
            match slot {
                Slot::Literal(text) => out.push_str(text),
                Slot::Category(_) => {
                    out.push_str(choices[next]);
                    next += 1;
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_compile_placeholders_and_literals() {
        let compiled = CompiledTemplate::compile("{意象}·{建筑}", &cats(&["意象", "建筑"])).unwrap();
        assert_eq!(
            compiled.slots(),
            &[
                Slot::Category("意象".into()),
                Slot::Literal("·".into()),
                Slot::Category("建筑".into()),
            ]
        );
    }

    #[test]
    fn test_compile_no_placeholder_is_single_literal() {
        let compiled = CompiledTemplate::compile("静水流深", &cats(&[])).unwrap();
        assert_eq!(compiled.slots(), &[Slot::Literal("静水流深".into())]);
        assert_eq!(compiled.category_refs().count(), 0);
    }

    #[test]
    fn test_compile_is_deterministic() {
        let names = cats(&["a", "b"]);
        let one = CompiledTemplate::compile("{a}x{b}", &names).unwrap();
        let two = CompiledTemplate::compile("{a}x{b}", &names).unwrap();
        assert_eq!(one, two);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let err = CompiledTemplate::compile("{missing}", &cats(&["present"])).unwrap_err();
        assert!(matches!(err, EngineError::UnknownCategory { category, .. } if category == "missing"));
    }

    #[test]
    fn test_unbalanced_braces_rejected() {
        for bad in ["{open", "close}", "{a}{", "{ne{st}}"] {
            let err = CompiledTemplate::compile(bad, &cats(&["a", "ne", "st"])).unwrap_err();
            assert!(matches!(err, EngineError::MalformedTemplate { .. }), "{bad}");
        }
    }

    #[test]
    fn test_empty_placeholder_rejected() {
        let err = CompiledTemplate::compile("{}", &cats(&["a"])).unwrap_err();
        assert!(matches!(err, EngineError::MalformedTemplate { .. }));
    }

    #[test]
    fn test_repeated_category_counted_per_slot() {
        let compiled = CompiledTemplate::compile("{a}{a}", &cats(&["a"])).unwrap();
        assert_eq!(compiled.category_refs().collect::<Vec<_>>(), vec!["a", "a"]);
    }

    #[test]
    fn test_render_consumes_choices_in_order() {
        let compiled = CompiledTemplate::compile("{a}-{b}", &cats(&["a", "b"])).unwrap();
        assert_eq!(compiled.render(&["云", "轩"]), "云-轩");
    }
}
