//! Tolerant parsing of model output into trajectories and insights.
//!
//! Small local models rarely follow the requested format exactly, so every
//! field has a fallback and parsing never fails.
//!
//! Trajectory format:
//!
//! ```text
//! STEPS: [step one; step two]
//! OUTCOME: the answer
//! SUCCESS: true
//! USED_BULLETS: [0192a4f1, 77c3e9d0]
//! ```
//!
//! Insight format (repeatable):
//!
//! ```text
//! [Content: ...; Type: strategy; Confidence: 0.8]
//! ```

use std::sync::LazyLock;

use ace_core::{Insight, InsightType, ReasoningStep, Trajectory};
use regex_lite::Regex;
use tracing::debug;

static STEPS: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?is)STEPS:\s*\[(.*?)\]"));
static OUTCOME: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?i)OUTCOME:\s*([^\n]+)"));
static SUCCESS: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?i)SUCCESS:\s*(true|false)"));
static USED_BULLETS: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?is)USED_BULLETS:\s*\[(.*?)\]"));
static INSIGHT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r"(?is)\[\s*Content:\s*([^\[\]]+?)\s*;\s*Type:\s*([^\[\]]+?)\s*;\s*Confidence:\s*([^\[\]]*?)\s*\]")
});

/// Steps taken from the first lines of free-form output.
const FALLBACK_STEP_LINES: usize = 3;

/// Characters of raw output used as the outcome when none is labelled.
const FALLBACK_OUTCOME_CHARS: usize = 200;

/// Sentences at most this long are too short to stand alone as an insight.
const FALLBACK_SENTENCE_MIN_CHARS: usize = 20;

const FALLBACK_SENTENCE_CONFIDENCE: f64 = 0.6;
const DEFAULT_INSIGHT_CONFIDENCE: f64 = 0.5;
const DEFAULT_INSIGHT: &str = "Task completed successfully";
const DEFAULT_STEP: &str = "Processed query";

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern).ok()
}

fn capture<'t>(re: &LazyLock<Option<Regex>>, text: &'t str) -> Option<&'t str> {
    re.as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn split_list(list: &str, separator: char) -> Vec<String> {
    list.split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Parse a generation response into a [`Trajectory`] for `query`.
pub fn parse_trajectory(query: &str, raw: &str) -> Trajectory {
    let steps = match capture(&STEPS, raw) {
        Some(list) => split_list(list, ';'),
        None => {
            debug!("No STEPS section, using leading lines");
            let lines: Vec<String> = raw
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .take(FALLBACK_STEP_LINES)
                .map(String::from)
                .collect();
            if lines.is_empty() {
                vec![DEFAULT_STEP.to_string()]
            } else {
                lines
            }
        }
    };

    let outcome = match capture(&OUTCOME, raw) {
        Some(outcome) => outcome.trim().to_string(),
        None => {
            debug!("No OUTCOME line, using response prefix");
            raw.chars().take(FALLBACK_OUTCOME_CHARS).collect()
        }
    };

    let success = capture(&SUCCESS, raw).is_none_or(|s| s.eq_ignore_ascii_case("true"));

    let used_bullets = capture(&USED_BULLETS, raw)
        .map(|list| split_list(list, ','))
        .unwrap_or_default();

    Trajectory {
        query: query.to_string(),
        steps: steps.into_iter().map(ReasoningStep::new).collect(),
        outcome,
        success,
        used_bullets,
        feedback: None,
    }
}

/// Parse a reflection response into insights attributed to `source_id`.
///
/// Blocks with a confidence that is not a number in `[0, 1]` are skipped.
/// When no block survives, the first sentence longer than 20 characters
/// becomes a strategy insight; failing that, a generic one is returned.
/// The result is never empty.
pub fn parse_insights(raw: &str, source_id: &str) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some(re) = INSIGHT.as_ref() {
        for caps in re.captures_iter(raw) {
            let (Some(content), Some(kind), Some(confidence)) =
                (caps.get(1), caps.get(2), caps.get(3))
            else {
                continue;
            };

            let confidence = match confidence.as_str().trim().parse::<f64>() {
                Ok(c) if (0.0..=1.0).contains(&c) => c,
                _ => {
                    debug!(value = confidence.as_str(), "Skipping insight with bad confidence");
                    continue;
                }
            };

            let content = content.as_str().trim();
            if content.is_empty() {
                continue;
            }

            insights.push(Insight {
                content: content.to_string(),
                insight_type: InsightType::from(kind.as_str().trim()),
                confidence,
                source_id: source_id.to_string(),
            });
        }
    }

    if insights.is_empty() {
        debug!("No structured insights, falling back to first sentence");
        let fallback = raw
            .split('.')
            .map(str::trim)
            .find(|s| s.chars().count() > FALLBACK_SENTENCE_MIN_CHARS);

        insights.push(match fallback {
            Some(sentence) => Insight {
                content: sentence.to_string(),
                insight_type: InsightType::Strategy,
                confidence: FALLBACK_SENTENCE_CONFIDENCE,
                source_id: source_id.to_string(),
            },
            None => Insight {
                content: DEFAULT_INSIGHT.to_string(),
                insight_type: InsightType::Strategy,
                confidence: DEFAULT_INSIGHT_CONFIDENCE,
                source_id: source_id.to_string(),
            },
        });
    }

    insights
}
