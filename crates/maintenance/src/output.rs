use std::fmt;

use serde::Serialize;
use treino_domain::{Action, CatalogSummary, Decision, Mode, Outcome, Reason, Report, Resolution};

pub struct ReportText<'a>(pub &'a Report);

impl fmt::Display for ReportText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;

        for resolution in &report.resolutions {
            writeln!(f, "{}", ResolutionText(resolution))?;
        }

        writeln!(f, "mode: {}", report.mode)?;
        writeln!(f, "exercises: {}", report.exercises)?;
        writeln!(f, "pairs processed: {}", report.candidates())?;
        writeln!(f, "deleted: {}", report.deleted())?;
        writeln!(f, "deactivated: {}", report.deactivated())?;
        writeln!(f, "unchanged: {}", report.unchanged())?;
        writeln!(f, "review: {}", report.review())?;
        writeln!(f, "skipped: {}", report.skipped())?;
        write!(f, "failed: {}", report.failed())
    }
}

struct ResolutionText<'a>(&'a Resolution);

impl fmt::Display for ResolutionText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let candidate = &self.0.candidate;

        write!(
            f,
            "\"{}\" / \"{}\" ({:.0}%): ",
            candidate.first,
            candidate.second,
            candidate.similarity * 100.0
        )?;

        match &self.0.decision {
            Some(Decision::Retire(retirement)) => write!(
                f,
                "{} \"{}\", keep \"{}\" ({})",
                retirement.action, retirement.retire, retirement.keep, retirement.reason
            )?,
            Some(Decision::Review) => write!(f, "both in use")?,
            None => write!(f, "already deleted")?,
        }

        match &self.0.outcome {
            Outcome::Applied => write!(f, " [applied]"),
            Outcome::Planned => write!(f, " [planned]"),
            Outcome::Unchanged => write!(f, " [unchanged]"),
            Outcome::Review => write!(f, " [review]"),
            Outcome::Skipped => write!(f, " [skipped]"),
            Outcome::Failed(message) => write!(f, " [failed: {message}]"),
        }
    }
}

pub struct SummaryText<'a>(pub &'a CatalogSummary);

impl fmt::Display for SummaryText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "exercises: {}", self.0.total)?;
        write!(f, "active: {}", self.0.active)?;
        for (muscle_group, count) in &self.0.muscle_groups {
            write!(f, "\n  {muscle_group}: {count}")?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct ReportJson<'a> {
    #[serde(with = "ModeDef")]
    mode: Mode,
    exercises: usize,
    pairs_processed: usize,
    deleted: usize,
    deactivated: usize,
    unchanged: usize,
    review: usize,
    skipped: usize,
    failed: usize,
    pairs: Vec<PairJson<'a>>,
}

impl<'a> From<&'a Report> for ReportJson<'a> {
    fn from(report: &'a Report) -> Self {
        Self {
            mode: report.mode,
            exercises: report.exercises,
            pairs_processed: report.candidates(),
            deleted: report.deleted(),
            deactivated: report.deactivated(),
            unchanged: report.unchanged(),
            review: report.review(),
            skipped: report.skipped(),
            failed: report.failed(),
            pairs: report.resolutions.iter().map(PairJson::from).collect(),
        }
    }
}

#[derive(Serialize)]
struct PairJson<'a> {
    first: &'a str,
    second: &'a str,
    similarity: f64,
    #[serde(flatten)]
    retirement: Option<RetirementJson<'a>>,
    #[serde(with = "OutcomeDef")]
    outcome: Outcome,
}

impl<'a> From<&'a Resolution> for PairJson<'a> {
    fn from(resolution: &'a Resolution) -> Self {
        Self {
            first: resolution.candidate.first.as_str(),
            second: resolution.candidate.second.as_str(),
            similarity: resolution.candidate.similarity,
            retirement: match &resolution.decision {
                Some(Decision::Retire(retirement)) => Some(RetirementJson {
                    keep: retirement.keep.as_str(),
                    retire: retirement.retire.as_str(),
                    reason: retirement.reason,
                    action: retirement.action,
                }),
                Some(Decision::Review) | None => None,
            },
            outcome: resolution.outcome.clone(),
        }
    }
}

#[derive(Serialize)]
struct RetirementJson<'a> {
    keep: &'a str,
    retire: &'a str,
    #[serde(with = "ReasonDef")]
    reason: Reason,
    #[serde(with = "ActionDef")]
    action: Action,
}

#[derive(Serialize)]
#[serde(remote = "Mode", rename_all = "snake_case")]
enum ModeDef {
    Apply,
    DryRun,
}

#[derive(Serialize)]
#[serde(remote = "Reason", rename_all = "snake_case")]
enum ReasonDef {
    InUse,
    Active,
    MoreComplete,
}

#[derive(Serialize)]
#[serde(remote = "Action", rename_all = "snake_case")]
enum ActionDef {
    Deactivate,
    Delete,
}

#[derive(Serialize)]
#[serde(remote = "Outcome", rename_all = "snake_case")]
enum OutcomeDef {
    Applied,
    Planned,
    Unchanged,
    Review,
    Skipped,
    Failed(String),
}
