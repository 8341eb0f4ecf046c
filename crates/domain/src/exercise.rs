use std::collections::BTreeMap;

use derive_more::{AsRef, Deref, Display};

use crate::{CreateError, DeleteError, Name, ReadError, UpdateError};

#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError>;
    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    /// Returns all exercises ordered by name, then by ID.
    async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn create_exercise(&self, exercise: Exercise) -> Result<Exercise, CreateError>;
    async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError>;
    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub active: bool,
    pub description: Option<String>,
    pub execution_technique: Option<String>,
    pub common_errors: Vec<String>,
    pub muscle_group: String,
}

impl Exercise {
    /// Amount of descriptive content, used to choose between otherwise equal duplicates.
    ///
    /// Text fields contribute their number of characters, the list of common errors its number
    /// of entries.
    #[must_use]
    pub fn completeness(&self) -> usize {
        self.description.as_deref().map_or(0, |d| d.chars().count())
            + self
                .execution_technique
                .as_deref()
                .map_or(0, |t| t.chars().count())
            + self.common_errors.len()
    }
}

#[derive(AsRef, Deref, Display, Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(String);

impl From<&str> for ExerciseID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ExerciseID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CatalogSummary {
    pub total: usize,
    pub active: usize,
    pub muscle_groups: BTreeMap<String, usize>,
}

#[must_use]
pub fn catalog_summary(exercises: &[Exercise]) -> CatalogSummary {
    let mut summary = CatalogSummary {
        total: exercises.len(),
        ..CatalogSummary::default()
    };

    for exercise in exercises.iter().filter(|e| e.active) {
        summary.active += 1;
        *summary
            .muscle_groups
            .entry(exercise.muscle_group.clone())
            .or_default() += 1;
    }

    summary
}
