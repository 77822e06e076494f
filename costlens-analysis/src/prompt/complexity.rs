//! Prompt complexity scoring.
//!
//! Scores are coarse: 1 for a plain instruction, up to 5 for a prompt that
//! asks for several kinds of deep reasoning. They only need to separate
//! "summarize this" from "analyze and compare in detail".

/// Stems that indicate a reasoning-heavy request. Matched case-insensitively
/// as substrings.
const COMPLEXITY_CUES: &[&str] = &[
    "analyz",
    "analys",
    "evaluat",
    "compar",
    "comprehensive",
    "in detail",
    "detailed",
    "reasoning",
    "thorough",
    "systematic",
    "perspectives",
    "trade-off",
    "implications",
    "edge case",
    "assess",
];

/// Phrases showing the prompt already structures the model's reasoning.
const REASONING_MARKERS: &[&str] = &[
    "step by step",
    "step-by-step",
    "think through",
    "think about",
    "<thinking>",
    "first,",
    "let's work",
];

/// Highest score [`complexity_score`] returns.
pub const MAX_COMPLEXITY: u8 = 5;

/// Distinct complexity cues found in `text`, in table order.
pub fn complexity_cues(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    COMPLEXITY_CUES
        .iter()
        .copied()
        .filter(|cue| lower.contains(cue))
        .collect()
}

/// 1 plus the number of distinct cues, capped at [`MAX_COMPLEXITY`].
pub fn complexity_score(text: &str) -> u8 {
    let cues = complexity_cues(text).len().min(usize::from(MAX_COMPLEXITY - 1));
    1 + cues as u8
}

pub fn has_complexity_cues(text: &str) -> bool {
    !complexity_cues(text).is_empty()
}

/// Chain-of-thought phrasing or a numbered step list.
pub fn has_reasoning_markers(text: &str) -> bool {
    let lower = text.to_lowercase();
    if REASONING_MARKERS.iter().any(|m| lower.contains(m)) {
        return true;
    }
    lower.lines().any(|line| {
        let line = line.trim_start();
        let digits = line.bytes().take_while(u8::is_ascii_digit).count();
        digits > 0 && line[digits..].starts_with(". ")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_instruction_scores_one() {
        assert_eq!(complexity_score("Summarize this text briefly."), 1);
        assert!(!has_complexity_cues("List the key points."));
    }

    #[test]
    fn score_is_capped() {
        let text = "Analyze comprehensively, evaluate, compare systematically and thoroughly, \
                    with detailed reasoning about trade-offs and implications.";
        assert_eq!(complexity_score(text), MAX_COMPLEXITY);
    }

    #[test]
    fn numbered_steps_count_as_structure() {
        assert!(has_reasoning_markers("Do this:\n1. Read\n2. Decide"));
        assert!(has_reasoning_markers("Work through it step by step."));
        assert!(!has_reasoning_markers("Version 1.5 of the report"));
    }
}
