use std::collections::HashSet;

use derive_more::{Deref, Display};

use crate::{CreateError, ExerciseID, ReadError};

#[allow(async_fn_in_trait)]
pub trait WorkoutAssignmentService {
    async fn get_workout_assignments(&self) -> Result<Vec<WorkoutAssignment>, ReadError>;
}

#[allow(async_fn_in_trait)]
pub trait WorkoutAssignmentRepository {
    async fn read_workout_assignments(&self) -> Result<Vec<WorkoutAssignment>, ReadError>;
    async fn create_workout_assignment(
        &self,
        workout_id: WorkoutID,
        exercise_id: ExerciseID,
    ) -> Result<WorkoutAssignment, CreateError>;
}

/// Link between an exercise and a scheduled workout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutAssignment {
    pub id: WorkoutAssignmentID,
    pub workout_id: WorkoutID,
    pub exercise_id: ExerciseID,
}

#[derive(Deref, Display, Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkoutAssignmentID(i64);

impl From<i64> for WorkoutAssignmentID {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

#[derive(Deref, Display, Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkoutID(String);

impl From<&str> for WorkoutID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for WorkoutID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// IDs of all exercises referenced by at least one assignment.
#[must_use]
pub fn exercises_in_use(assignments: &[WorkoutAssignment]) -> HashSet<ExerciseID> {
    assignments.iter().map(|a| a.exercise_id.clone()).collect()
}
