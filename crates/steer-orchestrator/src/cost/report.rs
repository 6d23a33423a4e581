//! Post-run cost aggregation and the persisted report text format.
//!
//! Reports render as delimited, append-only text blocks with a fixed
//! header, and the narrow parser in [`parse_cost_reports`] re-extracts the
//! fields the display layers depend on. The write-then-read round trip is exact
//! for timestamp, mode, actual cost and savings.

use crate::cascade::types::EscalationResult;
use crate::routing::types::Mode;
use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use serde::Serialize;
use std::collections::HashMap;
use steer_models::{ModelRegistry, ModelTier};
use thiserror::Error;

/// Errors from the report parser.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A block header or field had an unparseable timestamp.
    #[error("Invalid report timestamp '{0}'")]
    Timestamp(String),

    /// A block named an unknown mode.
    #[error("Invalid mode '{0}' in report block")]
    Mode(String),

    /// A numeric field failed to parse.
    #[error("Invalid number in report line '{0}'")]
    Number(String),

    /// A block ended before a required field appeared.
    #[error("Missing field '{0}' in report block")]
    MissingField(&'static str),
}

/// One task's execution, folded into a feature report.
#[derive(Debug, Clone, Serialize)]
pub struct TaskExecution {
    /// Task identifier.
    pub task_id: String,
    /// Pre-run estimate for the task.
    pub estimated_cost: f64,
    /// Actual cost across all attempts.
    pub actual_cost: f64,
    /// Attempts the cascade made.
    pub attempts: u32,
    /// Model of the last attempt.
    pub final_model: String,
    /// Whether the cascade went past its first attempt.
    pub escalated: bool,
    /// Whether the task ultimately succeeded.
    pub success: bool,
}

impl TaskExecution {
    /// Builds an execution record from a cascade result.
    #[must_use]
    pub fn from_result(
        task_id: impl Into<String>,
        estimated_cost: f64,
        result: &EscalationResult,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            estimated_cost,
            actual_cost: result.actual_cost,
            attempts: result.attempts,
            final_model: result.final_model.clone(),
            escalated: result.escalated(),
            success: result.success,
        }
    }
}

/// Aggregated cost report for a feature's completed task executions.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureCostReport {
    /// Feature name.
    pub feature: String,
    /// Mode the feature ran under.
    pub mode: Mode,
    /// When the report was generated (second precision).
    pub generated_at: DateTime<Utc>,
    /// Per-task execution records.
    pub executions: Vec<TaskExecution>,
    /// Sum of per-task estimates.
    pub total_estimated: f64,
    /// Sum of per-task actual costs.
    pub total_actual: f64,
    /// How many tasks escalated past their first attempt.
    pub escalation_count: usize,
    /// Rounded savings versus the baseline. 0 in genius mode.
    pub savings_percent: i64,
    /// 100 - |actual - estimated| / estimated x 100.
    pub estimate_accuracy: f64,
    /// Overrun attributable to escalated tasks, as a share of actual cost.
    pub escalation_overhead_percent: f64,
    /// Share of tasks finishing in each tier, best tier first.
    pub tier_utilization: Vec<(ModelTier, f64)>,
}

impl FeatureCostReport {
    /// Aggregates executions into a report.
    ///
    /// `baseline_cost` is the genius-mode projection for the same tasks;
    /// savings are computed against it and forced to 0 when `mode` is
    /// genius (it defines the baseline).
    #[must_use]
    pub fn new(
        feature: impl Into<String>,
        mode: Mode,
        executions: Vec<TaskExecution>,
        baseline_cost: f64,
        registry: &ModelRegistry,
    ) -> Self {
        let total_estimated: f64 = executions.iter().map(|e| e.estimated_cost).sum();
        let total_actual: f64 = executions.iter().map(|e| e.actual_cost).sum();
        let escalation_count = executions.iter().filter(|e| e.escalated).count();

        let savings_percent = if mode == Mode::Genius || baseline_cost <= 0.0 {
            0
        } else {
            ((baseline_cost - total_actual) / baseline_cost * 100.0).round() as i64
        };

        let estimate_accuracy = if total_estimated > 0.0 {
            100.0 - (total_actual - total_estimated).abs() / total_estimated * 100.0
        } else if total_actual == 0.0 {
            100.0
        } else {
            0.0
        };

        let overrun: f64 = executions
            .iter()
            .filter(|e| e.escalated)
            .map(|e| (e.actual_cost - e.estimated_cost).max(0.0))
            .sum();
        let escalation_overhead_percent = if total_actual > 0.0 {
            overrun / total_actual * 100.0
        } else {
            0.0
        };

        let mut tier_counts: HashMap<ModelTier, usize> = HashMap::new();
        for execution in &executions {
            if let Some(model) = registry.model(&execution.final_model) {
                *tier_counts.entry(model.tier).or_insert(0) += 1;
            }
        }
        let total = executions.len();
        let tier_utilization = ModelTier::BEST_FIRST
            .iter()
            .map(|tier| {
                let count = tier_counts.get(tier).copied().unwrap_or(0);
                let pct = if total > 0 {
                    count as f64 / total as f64 * 100.0
                } else {
                    0.0
                };
                (*tier, pct)
            })
            .collect();

        Self {
            feature: feature.into(),
            mode,
            // Second precision so the rendered timestamp reads back exactly.
            generated_at: Utc::now().with_nanosecond(0).unwrap_or_else(Utc::now),
            executions,
            total_estimated,
            total_actual,
            escalation_count,
            savings_percent,
            estimate_accuracy,
            escalation_overhead_percent,
            tier_utilization,
        }
    }

    /// Renders the report as one append-only text block.
    #[must_use]
    pub fn render(&self) -> String {
        let tiers = self
            .tier_utilization
            .iter()
            .map(|(tier, pct)| format!("{tier} {pct:.0}%"))
            .collect::<Vec<_>>()
            .join(" / ");

        format!(
            "## Cost Report - {}\n\
             Feature: {}\n\
             Mode: {}\n\
             Tasks: {} ({} escalated)\n\
             Estimated cost: ${:.2}\n\
             Actual cost: ${:.2} (saved {}% vs genius baseline)\n\
             Estimate accuracy: {:.0}%\n\
             Escalation overhead: {:.0}%\n\
             Tier utilization: {}\n",
            self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.feature,
            self.mode,
            self.executions.len(),
            self.escalation_count,
            self.total_estimated,
            self.total_actual,
            self.savings_percent,
            self.estimate_accuracy,
            self.escalation_overhead_percent,
            tiers,
        )
    }
}

/// The fields the narrow parser re-extracts from a report block.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCostReport {
    /// Timestamp from the block header.
    pub generated_at: DateTime<Utc>,
    /// Feature name.
    pub feature: String,
    /// Mode the feature ran under.
    pub mode: Mode,
    /// Actual cost.
    pub actual_cost: f64,
    /// Savings percentage.
    pub savings_percent: i64,
}

/// Header prefix that delimits report blocks.
const HEADER_PREFIX: &str = "## Cost Report - ";

/// Extracts every report block from an append-only log.
///
/// # Errors
/// Returns an error on a malformed header or a block missing one of the
/// required fields.
pub fn parse_cost_reports(text: &str) -> Result<Vec<ParsedCostReport>, ReportError> {
    let mut reports = Vec::new();

    let mut generated_at: Option<DateTime<Utc>> = None;
    let mut feature: Option<String> = None;
    let mut mode: Option<Mode> = None;
    let mut actual: Option<(f64, i64)> = None;

    let finish = |generated_at: &mut Option<DateTime<Utc>>,
                      feature: &mut Option<String>,
                      mode: &mut Option<Mode>,
                      actual: &mut Option<(f64, i64)>|
     -> Result<Option<ParsedCostReport>, ReportError> {
        let Some(generated_at) = generated_at.take() else {
            return Ok(None);
        };
        let feature = feature.take().ok_or(ReportError::MissingField("Feature"))?;
        let mode = mode.take().ok_or(ReportError::MissingField("Mode"))?;
        let (actual_cost, savings_percent) =
            actual.take().ok_or(ReportError::MissingField("Actual cost"))?;
        Ok(Some(ParsedCostReport {
            generated_at,
            feature,
            mode,
            actual_cost,
            savings_percent,
        }))
    };

    for line in text.lines() {
        if let Some(timestamp) = line.strip_prefix(HEADER_PREFIX) {
            if let Some(report) = finish(&mut generated_at, &mut feature, &mut mode, &mut actual)? {
                reports.push(report);
            }
            let parsed = DateTime::parse_from_rfc3339(timestamp.trim())
                .map_err(|_| ReportError::Timestamp(timestamp.trim().to_string()))?;
            generated_at = Some(parsed.with_timezone(&Utc));
        } else if generated_at.is_some() {
            if let Some(value) = line.strip_prefix("Feature: ") {
                feature = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("Mode: ") {
                let value = value.trim();
                mode = Some(Mode::from_str(value).ok_or_else(|| {
                    ReportError::Mode(value.to_string())
                })?);
            } else if let Some(value) = line.strip_prefix("Actual cost: $") {
                let cost_part = value
                    .split_whitespace()
                    .next()
                    .ok_or_else(|| ReportError::Number(line.to_string()))?;
                let cost: f64 = cost_part
                    .parse()
                    .map_err(|_| ReportError::Number(line.to_string()))?;
                let savings = value
                    .split_once("(saved ")
                    .and_then(|(_, rest)| rest.split_once('%'))
                    .map(|(n, _)| n.parse::<i64>())
                    .transpose()
                    .map_err(|_| ReportError::Number(line.to_string()))?
                    .ok_or(ReportError::MissingField("saved"))?;
                actual = Some((cost, savings));
            }
        }
    }

    if let Some(report) = finish(&mut generated_at, &mut feature, &mut mode, &mut actual)? {
        reports.push(report);
    }

    Ok(reports)
}

/// Formats an estimated-vs-actual delta as a signed percentage.
#[must_use]
pub fn format_delta(estimated: f64, actual: f64) -> String {
    if estimated <= 0.0 {
        return "+0%".to_string();
    }
    let pct = ((actual - estimated) / estimated * 100.0).round();
    format!("{pct:+.0}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn execution(
        task_id: &str,
        estimated: f64,
        actual: f64,
        attempts: u32,
        final_model: &str,
    ) -> TaskExecution {
        TaskExecution {
            task_id: task_id.to_string(),
            estimated_cost: estimated,
            actual_cost: actual,
            attempts,
            final_model: final_model.to_string(),
            escalated: attempts > 1,
            success: true,
        }
    }

    fn sample_report() -> FeatureCostReport {
        let registry = ModelRegistry::built_in();
        FeatureCostReport::new(
            "auth-revamp",
            Mode::Cheap,
            vec![
                execution("t1", 0.20, 0.18, 1, "claude-haiku-4-5"),
                execution("t2", 0.30, 0.45, 2, "claude-sonnet-4-5"),
            ],
            2.25,
            &registry,
        )
    }

    #[test]
    fn test_aggregates_totals_and_escalations() {
        let report = sample_report();
        assert!((report.total_actual - 0.63).abs() < 1e-9);
        assert!((report.total_estimated - 0.50).abs() < 1e-9);
        assert_eq!(report.escalation_count, 1);
    }

    #[test]
    fn test_tier_utilization_shares() {
        let report = sample_report();
        let by_tier: HashMap<ModelTier, f64> = report.tier_utilization.iter().copied().collect();
        assert_eq!(by_tier[&ModelTier::Cheap], 50.0);
        assert_eq!(by_tier[&ModelTier::Premium], 50.0);
        assert_eq!(by_tier[&ModelTier::Sota], 0.0);
    }

    #[test]
    fn test_escalation_overhead_only_counts_escalated_overrun() {
        let report = sample_report();
        // t2 overran by 0.15; t1 under-ran and contributes nothing.
        let expected = 0.15 / 0.63 * 100.0;
        assert!((report.escalation_overhead_percent - expected).abs() < 1e-9);
    }

    #[test]
    fn test_genius_mode_forces_zero_savings() {
        let registry = ModelRegistry::built_in();
        let report = FeatureCostReport::new(
            "baseline",
            Mode::Genius,
            vec![execution("t1", 1.0, 1.0, 1, "claude-opus-4-1")],
            1.0,
            &registry,
        );
        assert_eq!(report.savings_percent, 0);
    }

    #[test]
    fn test_render_parse_round_trip() {
        let report = sample_report();
        let rendered = report.render();

        let parsed = parse_cost_reports(&rendered).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].generated_at, report.generated_at);
        assert_eq!(parsed[0].feature, "auth-revamp");
        assert_eq!(parsed[0].mode, Mode::Cheap);
        assert!((parsed[0].actual_cost - 0.63).abs() < 1e-9);
        assert_eq!(parsed[0].savings_percent, report.savings_percent);
    }

    #[test]
    fn test_parse_multiple_appended_blocks() {
        let report = sample_report();
        let mut log = String::new();
        log.push_str(&report.render());
        log.push('\n');
        log.push_str(&report.render());

        let parsed = parse_cost_reports(&log).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].feature, parsed[1].feature);
    }

    #[test]
    fn test_parse_ignores_unrelated_text() {
        let report = sample_report();
        let log = format!("# Progress log\n\nsome notes\n\n{}\nmore notes\n", report.render());
        let parsed = parse_cost_reports(&log).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_parse_rejects_block_missing_mode() {
        let text = "## Cost Report - 2026-08-05T10:00:00Z\nFeature: x\nActual cost: $1.00 (saved 10% vs genius baseline)\n";
        let result = parse_cost_reports(text);
        assert!(matches!(result, Err(ReportError::MissingField("Mode"))));
    }

    #[test]
    fn test_parse_rejects_bad_timestamp() {
        let text = "## Cost Report - not-a-date\nFeature: x\nMode: cheap\nActual cost: $1.00 (saved 10% vs genius baseline)\n";
        assert!(matches!(
            parse_cost_reports(text),
            Err(ReportError::Timestamp(_))
        ));
    }

    #[test]
    fn test_format_delta_signs() {
        assert_eq!(format_delta(2.50, 2.75), "+10%");
        assert_eq!(format_delta(2.50, 2.25), "-10%");
        assert_eq!(format_delta(2.50, 2.50), "+0%");
        assert_eq!(format_delta(0.0, 1.0), "+0%");
    }
}
