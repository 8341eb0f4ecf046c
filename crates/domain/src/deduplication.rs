//! Duplicate resolution
//!
//! Every pair of exercises is compared in catalog order. For each duplicate pair one exercise is
//! kept and the other is deactivated or, if it is an unused exact duplicate, deleted.

use std::collections::{HashMap, HashSet};

use crate::{
    Exercise, ExerciseID, ReadError, WorkoutAssignment, exercises_in_use, is_duplicate,
    is_exact_duplicate, similarity,
};

#[allow(async_fn_in_trait)]
pub trait DeduplicationService {
    /// Find duplicate exercises and retire the redundant ones.
    ///
    /// Only the initial read of exercises and workout assignments is fatal. A failure to retire
    /// a single exercise is logged and recorded in the report, and the remaining pairs are still
    /// processed.
    async fn resolve_duplicates(&self, mode: Mode) -> Result<Report, ReadError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum Mode {
    #[strum(serialize = "apply")]
    Apply,
    #[strum(serialize = "dry run")]
    DryRun,
}

/// Pair of exercises whose names are similar enough to be duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub first: ExerciseID,
    pub second: ExerciseID,
    pub similarity: f64,
}

/// Compare all pairs of exercises in catalog order (see [`Name`](crate::Name)), equal names
/// ordered by ID.
#[must_use]
pub fn find_candidates(exercises: &[Exercise]) -> Vec<Candidate> {
    let mut ordered = exercises.iter().collect::<Vec<_>>();
    ordered.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

    let mut candidates = vec![];

    for (i, first) in ordered.iter().enumerate() {
        for second in &ordered[i + 1..] {
            let score = similarity(first.name.as_str(), second.name.as_str());
            if is_duplicate(score) {
                candidates.push(Candidate {
                    first: first.id.clone(),
                    second: second.id.clone(),
                    similarity: score,
                });
            }
        }
    }

    candidates
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum Reason {
    #[strum(serialize = "in use")]
    InUse,
    #[strum(serialize = "active")]
    Active,
    #[strum(serialize = "more complete")]
    MoreComplete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum Action {
    #[strum(serialize = "deactivate")]
    Deactivate,
    #[strum(serialize = "delete")]
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retirement {
    pub keep: ExerciseID,
    pub retire: ExerciseID,
    pub reason: Reason,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Retire(Retirement),
    /// Both exercises are in use and must be merged manually.
    Review,
}

#[derive(Clone, Copy, Debug)]
pub struct Side<'a> {
    pub exercise: &'a Exercise,
    pub in_use: bool,
}

/// Decide which exercise of a duplicate pair to keep.
///
/// Exercises in use take precedence over unused ones, active exercises over inactive ones and
/// more complete exercises over less complete ones. On equal completeness the first exercise is
/// kept. Only unused exact duplicates are deleted, all other retired exercises are deactivated.
#[must_use]
pub fn decide(first: Side, second: Side, similarity: f64) -> Decision {
    let (keep, retire, reason) = match (first.in_use, second.in_use) {
        (true, false) => (first, second, Reason::InUse),
        (false, true) => (second, first, Reason::InUse),
        (true, true) => return Decision::Review,
        (false, false) => match (first.exercise.active, second.exercise.active) {
            (true, false) => (first, second, Reason::Active),
            (false, true) => (second, first, Reason::Active),
            _ => {
                if first.exercise.completeness() >= second.exercise.completeness() {
                    (first, second, Reason::MoreComplete)
                } else {
                    (second, first, Reason::MoreComplete)
                }
            }
        },
    };

    // An exercise in use must never be deleted.
    let action = if retire.in_use || !is_exact_duplicate(similarity) {
        Action::Deactivate
    } else {
        Action::Delete
    };

    Decision::Retire(Retirement {
        keep: keep.exercise.id.clone(),
        retire: retire.exercise.id.clone(),
        reason,
        action,
    })
}

/// Next step for a candidate pair given the current state of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// One of the exercises has already been deleted.
    Skip,
    Review,
    /// The exercise to retire is already inactive.
    Unchanged(Retirement),
    Retire(Retirement),
}

/// Working copy of the catalog during a resolution run.
///
/// Retirements are recorded as they are carried out, so that later pairs are decided on the
/// current state of their exercises.
pub struct Resolver {
    exercises: HashMap<ExerciseID, Exercise>,
    in_use: HashSet<ExerciseID>,
    candidates: Vec<Candidate>,
}

impl Resolver {
    #[must_use]
    pub fn new(exercises: Vec<Exercise>, assignments: &[WorkoutAssignment]) -> Self {
        let candidates = find_candidates(&exercises);
        Self {
            exercises: exercises.into_iter().map(|e| (e.id.clone(), e)).collect(),
            in_use: exercises_in_use(assignments),
            candidates,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    #[must_use]
    pub fn exercise(&self, id: &ExerciseID) -> Option<&Exercise> {
        self.exercises.get(id)
    }

    #[must_use]
    pub fn step(&self, candidate: &Candidate) -> Step {
        let (Some(first), Some(second)) = (
            self.exercises.get(&candidate.first),
            self.exercises.get(&candidate.second),
        ) else {
            return Step::Skip;
        };

        let decision = decide(
            Side {
                exercise: first,
                in_use: self.in_use.contains(&first.id),
            },
            Side {
                exercise: second,
                in_use: self.in_use.contains(&second.id),
            },
            candidate.similarity,
        );

        match decision {
            Decision::Review => Step::Review,
            Decision::Retire(retirement) => {
                let retired = if retirement.retire == first.id {
                    first
                } else {
                    second
                };
                if retirement.action == Action::Deactivate && !retired.active {
                    Step::Unchanged(retirement)
                } else {
                    Step::Retire(retirement)
                }
            }
        }
    }

    pub fn record(&mut self, retirement: &Retirement) {
        match retirement.action {
            Action::Delete => {
                self.exercises.remove(&retirement.retire);
            }
            Action::Deactivate => {
                if let Some(exercise) = self.exercises.get_mut(&retirement.retire) {
                    exercise.active = false;
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Would have been applied outside of a dry run.
    Planned,
    Unchanged,
    Review,
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub candidate: Candidate,
    pub decision: Option<Decision>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub mode: Mode,
    pub exercises: usize,
    pub resolutions: Vec<Resolution>,
}

impl Report {
    #[must_use]
    pub fn new(mode: Mode, exercises: usize) -> Self {
        Self {
            mode,
            exercises,
            resolutions: vec![],
        }
    }

    #[must_use]
    pub fn candidates(&self) -> usize {
        self.resolutions.len()
    }

    #[must_use]
    pub fn deleted(&self) -> usize {
        self.retired(Action::Delete)
    }

    #[must_use]
    pub fn deactivated(&self) -> usize {
        self.retired(Action::Deactivate)
    }

    #[must_use]
    pub fn unchanged(&self) -> usize {
        self.count(|o| *o == Outcome::Unchanged)
    }

    #[must_use]
    pub fn review(&self) -> usize {
        self.count(|o| *o == Outcome::Review)
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| *o == Outcome::Skipped)
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    fn retired(&self, action: Action) -> usize {
        self.resolutions
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Applied | Outcome::Planned))
            .filter(|r| {
                matches!(&r.decision, Some(Decision::Retire(retirement)) if retirement.action == action)
            })
            .count()
    }

    fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.resolutions
            .iter()
            .filter(|r| predicate(&r.outcome))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::Name;

    fn exercise(id: &str, name: &str) -> Exercise {
        Exercise {
            id: id.into(),
            name: Name::new(name).unwrap(),
            active: true,
            description: None,
            execution_technique: None,
            common_errors: vec![],
            muscle_group: String::from("Quadríceps"),
        }
    }

    fn inactive(exercise: Exercise) -> Exercise {
        Exercise {
            active: false,
            ..exercise
        }
    }

    fn described(exercise: Exercise, description: &str) -> Exercise {
        Exercise {
            description: Some(description.to_string()),
            ..exercise
        }
    }

    fn retirement(keep: &str, retire: &str, reason: Reason, action: Action) -> Retirement {
        Retirement {
            keep: keep.into(),
            retire: retire.into(),
            reason,
            action,
        }
    }

    #[test]
    fn test_find_candidates() {
        assert_eq!(
            find_candidates(&[
                exercise("supino", "Supino"),
                exercise("agachamento-1", "Agachamento"),
                exercise("supino-reto", "Supino Reto"),
                exercise("agachamento-2", "AGACHAMENTO"),
                exercise("elevacao-1", "Elevação Pélvica"),
                exercise("elevacao-2", "Elevacao Pelvica"),
            ]),
            vec![
                Candidate {
                    first: "agachamento-1".into(),
                    second: "agachamento-2".into(),
                    similarity: 1.0,
                },
                Candidate {
                    first: "elevacao-2".into(),
                    second: "elevacao-1".into(),
                    similarity: 1.0,
                },
            ]
        );
    }

    #[test]
    fn test_find_candidates_orders_equal_names_by_id() {
        assert_eq!(
            find_candidates(&[
                exercise("b", "Remada Curvada"),
                exercise("a", "Remada Curvada"),
            ]),
            vec![Candidate {
                first: "a".into(),
                second: "b".into(),
                similarity: 1.0,
            }]
        );
    }

    #[test]
    fn test_find_candidates_none() {
        assert!(find_candidates(&[]).is_empty());
        assert!(find_candidates(&[exercise("a", "Agachamento")]).is_empty());
    }

    #[rstest]
    #[case::first_in_use(
        exercise("a", "A"),
        true,
        exercise("b", "B"),
        false,
        1.0,
        Decision::Retire(retirement("a", "b", Reason::InUse, Action::Delete))
    )]
    #[case::second_in_use_overrides_active_and_completeness(
        described(exercise("a", "A"), "Exercício completo"),
        false,
        inactive(exercise("b", "B")),
        true,
        1.0,
        Decision::Retire(retirement("b", "a", Reason::InUse, Action::Delete))
    )]
    #[case::in_use_similar_but_not_exact(
        exercise("a", "A"),
        false,
        exercise("b", "B"),
        true,
        0.95,
        Decision::Retire(retirement("b", "a", Reason::InUse, Action::Deactivate))
    )]
    #[case::both_in_use(
        exercise("a", "A"),
        true,
        described(exercise("b", "B"), "Mais completo"),
        true,
        1.0,
        Decision::Review
    )]
    #[case::first_active(
        exercise("a", "A"),
        false,
        described(inactive(exercise("b", "B")), "Mais completo"),
        false,
        1.0,
        Decision::Retire(retirement("a", "b", Reason::Active, Action::Delete))
    )]
    #[case::second_active(
        inactive(exercise("a", "A")),
        false,
        exercise("b", "B"),
        false,
        0.92,
        Decision::Retire(retirement("b", "a", Reason::Active, Action::Deactivate))
    )]
    #[case::second_more_complete(
        exercise("a", "A"),
        false,
        described(exercise("b", "B"), "Descrição"),
        false,
        0.99,
        Decision::Retire(retirement("b", "a", Reason::MoreComplete, Action::Delete))
    )]
    #[case::both_inactive_first_more_complete(
        described(inactive(exercise("a", "A")), "Descrição"),
        false,
        inactive(exercise("b", "B")),
        false,
        0.9,
        Decision::Retire(retirement("a", "b", Reason::MoreComplete, Action::Deactivate))
    )]
    #[case::tie_keeps_first(
        described(exercise("a", "A"), "abc"),
        false,
        described(exercise("b", "B"), "xyz"),
        false,
        1.0,
        Decision::Retire(retirement("a", "b", Reason::MoreComplete, Action::Delete))
    )]
    fn test_decide(
        #[case] first: Exercise,
        #[case] first_in_use: bool,
        #[case] second: Exercise,
        #[case] second_in_use: bool,
        #[case] similarity: f64,
        #[case] expected: Decision,
    ) {
        assert_eq!(
            decide(
                Side {
                    exercise: &first,
                    in_use: first_in_use
                },
                Side {
                    exercise: &second,
                    in_use: second_in_use
                },
                similarity
            ),
            expected
        );
    }

    fn assignment(exercise_id: &str) -> WorkoutAssignment {
        WorkoutAssignment {
            id: 1.into(),
            workout_id: "treino-a".into(),
            exercise_id: exercise_id.into(),
        }
    }

    #[test]
    fn test_resolver_retire_and_record_delete() {
        let mut resolver = Resolver::new(
            vec![
                exercise("a", "Agachamento"),
                exercise("b", "Agachamento"),
                exercise("c", "AGACHAMENTO"),
            ],
            &[],
        );
        let candidates = resolver.candidates().to_vec();

        assert_eq!(resolver.len(), 3);
        assert_eq!(candidates.len(), 3);

        let step = resolver.step(&candidates[0]);
        assert_eq!(
            step,
            Step::Retire(retirement("a", "b", Reason::MoreComplete, Action::Delete))
        );

        if let Step::Retire(r) = step {
            resolver.record(&r);
        }

        assert_eq!(resolver.len(), 2);
        assert_eq!(resolver.exercise(&"b".into()), None);
        assert_eq!(
            resolver.step(&candidates[1]),
            Step::Retire(retirement("a", "c", Reason::MoreComplete, Action::Delete))
        );
        assert_eq!(resolver.step(&candidates[2]), Step::Skip);
    }

    #[test]
    fn test_resolver_record_deactivate() {
        let mut resolver = Resolver::new(
            vec![
                exercise("a", "Puxada Frente Aberta Pronada"),
                exercise("b", "Puxada Frente Aberta Pronada!"),
                exercise("c", "Puxada Frente Aberta Pronada Polia"),
            ],
            &[assignment("c")],
        );
        let candidates = resolver.candidates().to_vec();
        assert_eq!(
            candidates,
            vec![Candidate {
                first: "a".into(),
                second: "b".into(),
                similarity: 1.0,
            }]
        );

        resolver.record(&retirement("a", "b", Reason::MoreComplete, Action::Deactivate));

        assert_eq!(
            resolver.exercise(&"b".into()).map(|e| e.active),
            Some(false)
        );
        assert_eq!(
            resolver.step(&candidates[0]),
            Step::Retire(retirement("a", "b", Reason::Active, Action::Delete))
        );
    }

    #[test]
    fn test_resolver_unchanged_when_already_inactive() {
        let resolver = Resolver::new(
            vec![
                exercise("a", "Rosca Martelo Alternada"),
                inactive(exercise("b", "Rosca Martelo Alternada 2")),
            ],
            &[],
        );
        assert_eq!(resolver.candidates().len(), 1);
        assert_eq!(
            resolver.step(&resolver.candidates()[0]),
            Step::Unchanged(retirement("a", "b", Reason::Active, Action::Deactivate))
        );
    }

    #[test]
    fn test_resolver_deletes_inactive_exact_duplicate() {
        let resolver = Resolver::new(
            vec![
                exercise("a", "Cadeira Extensora Unilateral"),
                inactive(exercise("b", "Cadeira Extensora Unilateral")),
            ],
            &[assignment("a")],
        );
        assert_eq!(
            resolver.step(&resolver.candidates()[0]),
            Step::Retire(retirement("a", "b", Reason::InUse, Action::Delete))
        );
    }

    #[test]
    fn test_resolver_deactivates_name_with_separated_symbol() {
        let resolver = Resolver::new(
            vec![
                exercise("a", "Supino Reto"),
                exercise("b", "Supino Reto -"),
            ],
            &[],
        );

        assert_eq!(resolver.candidates().len(), 1);
        assert_approx_eq!(resolver.candidates()[0].similarity, 11.0 / 12.0);
        assert_eq!(
            resolver.step(&resolver.candidates()[0]),
            Step::Retire(retirement(
                "a",
                "b",
                Reason::MoreComplete,
                Action::Deactivate
            ))
        );
    }

    #[test]
    fn test_resolver_review_when_both_in_use() {
        let resolver = Resolver::new(
            vec![
                exercise("a", "Cadeira Extensora Unilateral"),
                inactive(exercise("b", "Cadeira Extensora Unilateral")),
            ],
            &[assignment("a"), assignment("b")],
        );
        assert_eq!(resolver.step(&resolver.candidates()[0]), Step::Review);
    }

    #[test]
    fn test_report_counts() {
        let candidate = Candidate {
            first: "a".into(),
            second: "b".into(),
            similarity: 1.0,
        };
        let resolution = |decision: Option<Decision>, outcome: Outcome| Resolution {
            candidate: candidate.clone(),
            decision,
            outcome,
        };
        let delete = Some(Decision::Retire(retirement(
            "a",
            "b",
            Reason::Active,
            Action::Delete,
        )));
        let deactivate = Some(Decision::Retire(retirement(
            "a",
            "b",
            Reason::Active,
            Action::Deactivate,
        )));
        let report = Report {
            mode: Mode::Apply,
            exercises: 10,
            resolutions: vec![
                resolution(delete.clone(), Outcome::Applied),
                resolution(delete.clone(), Outcome::Planned),
                resolution(delete, Outcome::Failed(String::from("conflict"))),
                resolution(deactivate.clone(), Outcome::Applied),
                resolution(deactivate, Outcome::Unchanged),
                resolution(Some(Decision::Review), Outcome::Review),
                resolution(None, Outcome::Skipped),
            ],
        };

        assert_eq!(report.candidates(), 7);
        assert_eq!(report.deleted(), 2);
        assert_eq!(report.deactivated(), 1);
        assert_eq!(report.unchanged(), 1);
        assert_eq!(report.review(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
    }
}
