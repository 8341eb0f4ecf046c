use log::{debug, error, info, warn};

use crate::{
    Action, Decision, DeduplicationService, DeleteError, Exercise, ExerciseID, ExerciseRepository,
    ExerciseService, Mode, Outcome, ReadError, Report, Resolution, ResolveError, Resolver,
    Retirement, Step, UpdateError, WorkoutAssignment, WorkoutAssignmentRepository,
    WorkoutAssignmentService,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::Busy) => {
                    warn!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: ExerciseRepository> ExerciseService for Service<R> {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
        log_on_error!(
            self.repository.read_exercises(),
            ReadError,
            "get",
            "exercises"
        )
    }

    async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError> {
        log_on_error!(
            self.repository.replace_exercise(exercise),
            UpdateError,
            "replace",
            "exercise"
        )
    }

    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError> {
        log_on_error!(
            self.repository.delete_exercise(id),
            DeleteError,
            "delete",
            "exercise"
        )
    }
}

impl<R: WorkoutAssignmentRepository> WorkoutAssignmentService for Service<R> {
    async fn get_workout_assignments(&self) -> Result<Vec<WorkoutAssignment>, ReadError> {
        log_on_error!(
            self.repository.read_workout_assignments(),
            ReadError,
            "get",
            "workout assignments"
        )
    }
}

impl<R> Service<R>
where
    R: ExerciseRepository,
{
    async fn retire(
        &self,
        resolver: &Resolver,
        retirement: &Retirement,
    ) -> Result<(), ResolveError> {
        match retirement.action {
            Action::Delete => {
                self.delete_exercise(retirement.retire.clone()).await?;
            }
            Action::Deactivate => {
                let exercise = resolver
                    .exercise(&retirement.retire)
                    .cloned()
                    .ok_or(UpdateError::NotFound)?;
                self.replace_exercise(Exercise {
                    active: false,
                    ..exercise
                })
                .await?;
            }
        }
        Ok(())
    }
}

impl<R> DeduplicationService for Service<R>
where
    R: ExerciseRepository + WorkoutAssignmentRepository,
{
    async fn resolve_duplicates(&self, mode: Mode) -> Result<Report, ReadError> {
        let exercises = self.get_exercises().await?;
        let assignments = self.get_workout_assignments().await?;

        let mut resolver = Resolver::new(exercises, &assignments);
        let candidates = resolver.candidates().to_vec();
        let mut report = Report::new(mode, resolver.len());

        info!(
            "found {} duplicate candidates among {} exercises ({mode})",
            candidates.len(),
            resolver.len()
        );

        for candidate in candidates {
            let pair = format!(
                "\"{}\" / \"{}\" ({:.0}%)",
                candidate.first,
                candidate.second,
                candidate.similarity * 100.0
            );

            let (decision, outcome) = match resolver.step(&candidate) {
                Step::Skip => {
                    debug!("skipping {pair}: exercise already deleted");
                    (None, Outcome::Skipped)
                }
                Step::Review => {
                    warn!("{pair}: both exercises in use, manual review required");
                    (Some(Decision::Review), Outcome::Review)
                }
                Step::Unchanged(retirement) => {
                    debug!("{pair}: \"{}\" already inactive", retirement.retire);
                    (Some(Decision::Retire(retirement)), Outcome::Unchanged)
                }
                Step::Retire(retirement) => {
                    info!(
                        "{pair}: keep \"{}\" ({}), {} \"{}\"",
                        retirement.keep, retirement.reason, retirement.action, retirement.retire
                    );
                    let outcome = match mode {
                        Mode::DryRun => {
                            resolver.record(&retirement);
                            Outcome::Planned
                        }
                        Mode::Apply => match self.retire(&resolver, &retirement).await {
                            Ok(()) => {
                                resolver.record(&retirement);
                                Outcome::Applied
                            }
                            Err(err) => {
                                error!("failed to resolve {pair}: {err}");
                                Outcome::Failed(err.to_string())
                            }
                        },
                    };
                    (Some(Decision::Retire(retirement)), outcome)
                }
            };

            report.resolutions.push(Resolution {
                candidate,
                decision,
                outcome,
            });
        }

        info!(
            "deleted {}, deactivated {}, unchanged {}, review {}, skipped {}, failed {}",
            report.deleted(),
            report.deactivated(),
            report.unchanged(),
            report.review(),
            report.skipped(),
            report.failed()
        );

        Ok(report)
    }
}
