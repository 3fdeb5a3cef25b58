//! Candidate filter chain.
//!
//! Stages run in a fixed cheapest-first order and short-circuit on the first
//! rejection: length bounds, adjacent repeated character, forbidden
//! contiguous pairs, charset class. Every stage is a pure predicate of the
//! candidate and static configuration; nothing here remembers previously
//! seen candidates (that is the deduplicator's job).

use serde::{Deserialize, Serialize};

/// Character-class restriction a style may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CharsetClass {
    /// CJK ideographs only.
    Cjk,
    /// ASCII letters, digits, and punctuation.
    Latin,
    /// No restriction; the charset stage is disabled.
    #[default]
    Any,
}

impl CharsetClass {
    fn permits(self, ch: char) -> bool {
        match self {
            CharsetClass::Any => true,
            CharsetClass::Latin => ch.is_ascii_alphanumeric() || ch.is_ascii_punctuation(),
            CharsetClass::Cjk => matches!(
                ch as u32,
                // Unified ideographs, extension A, compatibility block.
                0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0xF900..=0xFAFF
            ),
        }
    }
}

/// Which stage rejected a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    Length,
    RepeatedChar,
    ForbiddenPair,
    Charset,
}

/// The compiled filter configuration for one style.
#[derive(Debug, Clone)]
pub struct FilterChain {
    length_min: usize,
    length_max: usize,
    forbid_adjacent_repeat: bool,
    forbidden_pairs: Vec<String>,
    charset: CharsetClass,
}

impl FilterChain {
    /// Build a chain from explicit parameters.
    ///
    /// `forbidden_pairs` are contiguous substrings; a candidate containing
    /// any of them is rejected. Lengths are inclusive bounds on the
    /// character count, not the byte count.
    pub fn new(
        length_min: usize,
        length_max: usize,
        forbid_adjacent_repeat: bool,
        forbidden_pairs: Vec<String>,
        charset: CharsetClass,
    ) -> Self {
        Self {
            length_min,
            length_max,
            forbid_adjacent_repeat,
            forbidden_pairs,
            charset,
        }
    }

    /// Run every enabled stage in order; `Err` names the rejecting stage.
    pub fn check(&self, candidate: &str) -> Result<(), FilterStage> {
        let chars = candidate.chars().count();
        if chars < self.length_min || chars > self.length_max {
            return Err(FilterStage::Length);
        }

        if self.forbid_adjacent_repeat {
            let mut previous: Option<char> = None;
            for ch in candidate.chars() {
                if previous == Some(ch) {
                    return Err(FilterStage::RepeatedChar);
                }
                previous = Some(ch);
            }
        }

        for pair in &self.forbidden_pairs {
            if !pair.is_empty() && candidate.contains(pair.as_str()) {
                return Err(FilterStage::ForbiddenPair);
            }
        }

        if self.charset != CharsetClass::Any
            && !candidate.chars().all(|ch| self.charset.permits(ch))
        {
            return Err(FilterStage::Charset);
        }

        Ok(())
    }

    /// True when the candidate passes every enabled stage.
    pub fn accepts(&self, candidate: &str) -> bool {
        self.check(candidate).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> FilterChain {
        FilterChain::new(2, 4, true, vec!["云月".to_string()], CharsetClass::Cjk)
    }

    #[test]
    fn test_length_bounds_are_inclusive_char_counts() {
        let chain = FilterChain::new(2, 4, false, Vec::new(), CharsetClass::Any);
        assert_eq!(chain.check("云"), Err(FilterStage::Length));
        assert!(chain.accepts("云轩"));
        assert!(chain.accepts("云轩月阁"));
        assert_eq!(chain.check("云轩月阁风"), Err(FilterStage::Length));
    }

    #[test]
    fn test_adjacent_repeat_rejected_when_enabled() {
        assert_eq!(chain().check("云云"), Err(FilterStage::RepeatedChar));
        // Pair-free candidate: the fixture forbids 云月, which 月云轩 avoids.
        assert!(chain().accepts("月云轩"));

        let relaxed = FilterChain::new(2, 4, false, Vec::new(), CharsetClass::Any);
        assert!(relaxed.accepts("云云"));
    }

    #[test]
    fn test_non_adjacent_repeat_allowed() {
        assert!(chain().accepts("云轩云"));
    }

    #[test]
    fn test_forbidden_pair_is_contiguous_substring() {
        assert_eq!(chain().check("云月轩"), Err(FilterStage::ForbiddenPair));
        // The fragments appear but not contiguously.
        assert!(chain().accepts("云轩月"));
    }

    #[test]
    fn test_charset_cjk_rejects_latin() {
        assert_eq!(chain().check("云a"), Err(FilterStage::Charset));
    }

    #[test]
    fn test_charset_latin_allows_punctuation() {
        let chain = FilterChain::new(2, 8, false, Vec::new(), CharsetClass::Latin);
        assert!(chain.accepts("Nova-7"));
        assert_eq!(chain.check("Nova云"), Err(FilterStage::Charset));
    }

    #[test]
    fn test_stage_order_reports_first_failure() {
        // Over-length and repeated: length is checked first.
        assert_eq!(chain().check("云云月轩阁"), Err(FilterStage::Length));
        // Repeated and contains the forbidden pair: repeat is checked first.
        assert_eq!(chain().check("云云月"), Err(FilterStage::RepeatedChar));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let chain = chain();
        assert!(chain.accepts("云轩"));
        assert!(chain.accepts("云轩"));
    }
}
