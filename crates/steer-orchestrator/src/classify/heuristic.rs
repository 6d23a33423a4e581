//! Heuristic complexity scorer.
//!
//! Scores each complexity level by counting weighted regex matches over the
//! normalized task text, applies boost rules for secondary signals, and
//! derives a confidence from the winner's margin. Runs in well under 50ms
//! and performs no I/O.

use super::{ClassificationResult, ClassifierStrategy};
use crate::routing::types::Complexity;
use crate::task::Task;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Per-level pattern weights.
const SIMPLE_WEIGHT: f64 = 0.30;
const MEDIUM_WEIGHT: f64 = 0.25;
const COMPLEX_WEIGHT: f64 = 0.35;
const EXPERT_WEIGHT: f64 = 0.40;

/// Additive boost applied when a secondary signal group matches.
const BOOST: f64 = 0.25;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("static classifier pattern"))
        .collect()
}

static SIMPLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\btypos?\b",
        r"\breadme\b",
        r"\bdocs?\b|\bdocumentation\b",
        r"\bcomments?\b",
        r"\brename\b",
        r"\bchangelog\b",
        r"\blicense\b",
        r"\bwhitespace\b|\breformat\b",
        r"\bspelling\b",
        r"\bupdate (the )?(readme|docs|documentation)\b",
    ])
});

static MEDIUM_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\bendpoints?\b",
        r"\bcrud\b",
        r"\bforms?\b",
        r"\bvalidat(e|ion)\b",
        r"\brefactor\b",
        r"\bcomponents?\b",
        r"\bhandlers?\b",
        r"\bunit tests?\b",
        r"\bconfig(uration)?\b",
        r"\bmigrations?\b",
    ])
});

static COMPLEX_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\bauth(entication|orization)?\b",
        r"\bjwt\b",
        r"\boauth2?\b",
        r"\bsecurity\b",
        r"\bencrypt(ion|ed)?\b",
        r"\bschema\b",
        r"\bintegrat(e|ion)\b",
        r"\bwebsockets?\b",
        r"\bstate machine\b",
        r"\bpayments?\b",
        r"\bmiddleware\b",
    ])
});

static EXPERT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\bperformance\b",
        r"\boptimi[sz](e|ation)\b",
        r"\bconcurren(t|cy)\b",
        r"\brace conditions?\b",
        r"\bdistributed\b",
        r"\bscalab(le|ility)\b",
        r"\bprofil(e|ing)\b",
        r"\bmemory leaks?\b",
        r"\bdeadlocks?\b|\block contention\b",
        r"\barchitecture\b",
    ])
});

// Secondary signal groups for the boost rules.
static DOC_BOOST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\breadme\b|\bdocs?\b|\bdocumentation\b|\bcomments?\b").unwrap());
static SECURITY_BOOST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bauth\w*\b|\bjwt\b|\boauth2?\b|\bsecurity\b|\btokens?\b").unwrap());
static PERF_BOOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bperformance\b|\bconcurren\w*\b|\bparallel\w*\b|\bthroughput\b|\blatency\b")
        .unwrap()
});

/// Phase-1 classifier: weighted keyword scoring over the task text.
#[derive(Debug, Default)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    /// Creates a new heuristic classifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn score(patterns: &[Regex], weight: f64, text: &str) -> (f64, usize) {
        let matches = patterns.iter().filter(|p| p.is_match(text)).count();
        (matches as f64 * weight, matches)
    }
}

impl ClassifierStrategy for HeuristicClassifier {
    fn classify(&self, task: &Task, _hint: Option<&ClassificationResult>) -> ClassificationResult {
        let text = task.normalized_text();

        let (mut simple, simple_hits) = Self::score(&SIMPLE_PATTERNS, SIMPLE_WEIGHT, &text);
        let (medium, medium_hits) = Self::score(&MEDIUM_PATTERNS, MEDIUM_WEIGHT, &text);
        let (mut complex, complex_hits) = Self::score(&COMPLEX_PATTERNS, COMPLEX_WEIGHT, &text);
        let (mut expert, expert_hits) = Self::score(&EXPERT_PATTERNS, EXPERT_WEIGHT, &text);

        if DOC_BOOST.is_match(&text) {
            simple += BOOST;
        }
        if SECURITY_BOOST.is_match(&text) {
            complex += BOOST;
        }
        if PERF_BOOST.is_match(&text) {
            expert += BOOST;
        }

        // Arg-max; ties resolve toward the simpler level.
        let scored = [
            (Complexity::Simple, simple),
            (Complexity::Medium, medium),
            (Complexity::Complex, complex),
            (Complexity::Expert, expert),
        ];
        let (complexity, winner) = scored
            .iter()
            .copied()
            .fold((Complexity::Simple, f64::MIN), |best, candidate| {
                if candidate.1 > best.1 { candidate } else { best }
            });
        let runner_up = scored
            .iter()
            .filter(|(c, _)| *c != complexity)
            .map(|(_, s)| *s)
            .fold(0.0_f64, f64::max);

        let confidence = ((0.5 + winner).min(0.95) + ((winner - runner_up) * 0.2).min(0.15))
            .min(0.95);

        let reasoning = format!(
            "keyword scores: simple={simple:.2} ({simple_hits} hits), \
             medium={medium:.2} ({medium_hits} hits), \
             complex={complex:.2} ({complex_hits} hits), \
             expert={expert:.2} ({expert_hits} hits)"
        );

        debug!(
            task_id = %task.id,
            complexity = %complexity,
            confidence,
            simple_score = simple,
            medium_score = medium,
            complex_score = complex,
            expert_score = expert,
            "Scored task complexity"
        );

        ClassificationResult {
            complexity,
            confidence,
            reasoning,
            used_external_model: false,
        }
    }
}
