//! SQLite
//!
//! Exercises and workout assignments are stored in a single SQLite database. Workout assignments
//! reference their exercise by a foreign key, so an exercise in use cannot be deleted.

#![allow(clippy::missing_errors_doc)]

use std::path::Path;

use log::debug;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params, types::Type};
use strum::AsRefStr;
use treino_domain as domain;

pub struct Sqlite {
    connection: Connection,
}

impl Sqlite {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqliteError> {
        let path = path.as_ref();
        debug!("opening database {}", path.display());
        Self::initialize(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, SqliteError> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(connection: Connection) -> Result<Self, SqliteError> {
        connection.execute_batch(&format!(
            "PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS {exercises} (
                id TEXT PRIMARY KEY NOT NULL,
                name TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1,
                description TEXT,
                execution_technique TEXT,
                common_errors TEXT NOT NULL DEFAULT '[]',
                muscle_group TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS {assignments} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workout_id TEXT NOT NULL,
                exercise_id TEXT NOT NULL REFERENCES {exercises} (id)
            );
            CREATE INDEX IF NOT EXISTS {assignments}_exercise_id
                ON {assignments} (exercise_id);",
            exercises = Table::Exercises.as_ref(),
            assignments = Table::WorkoutAssignments.as_ref(),
        ))?;
        Ok(Self { connection })
    }

    /// Exercises in catalog order. SQLite collates by bytes, so the order is applied after
    /// reading.
    fn exercises(&self) -> Result<Vec<domain::Exercise>, SqliteError> {
        let mut statement = self.connection.prepare(&format!(
            "SELECT {EXERCISE_COLUMNS} FROM {} ORDER BY id",
            Table::Exercises.as_ref()
        ))?;
        let mut exercises = statement
            .query_map([], row_to_exercise)?
            .collect::<Result<Vec<_>, _>>()?;
        exercises.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(exercises)
    }

    fn exercise(&self, id: &domain::ExerciseID) -> Result<domain::Exercise, SqliteError> {
        self.connection
            .query_row(
                &format!(
                    "SELECT {EXERCISE_COLUMNS} FROM {} WHERE id = ?1",
                    Table::Exercises.as_ref()
                ),
                [id.as_str()],
                row_to_exercise,
            )
            .optional()?
            .ok_or(SqliteError::NotFound)
    }

    fn insert_exercise(&self, exercise: &domain::Exercise) -> Result<(), SqliteError> {
        self.connection.execute(
            &format!(
                "INSERT INTO {} ({EXERCISE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                Table::Exercises.as_ref()
            ),
            params![
                exercise.id.as_str(),
                exercise.name.as_str(),
                exercise.active,
                exercise.description,
                exercise.execution_technique,
                serde_json::to_string(&exercise.common_errors)?,
                exercise.muscle_group,
            ],
        )?;
        Ok(())
    }

    fn update_exercise(&self, exercise: &domain::Exercise) -> Result<(), SqliteError> {
        let updated = self.connection.execute(
            &format!(
                "UPDATE {} SET name = ?2, active = ?3, description = ?4, \
                execution_technique = ?5, common_errors = ?6, muscle_group = ?7 WHERE id = ?1",
                Table::Exercises.as_ref()
            ),
            params![
                exercise.id.as_str(),
                exercise.name.as_str(),
                exercise.active,
                exercise.description,
                exercise.execution_technique,
                serde_json::to_string(&exercise.common_errors)?,
                exercise.muscle_group,
            ],
        )?;
        if updated == 0 {
            return Err(SqliteError::NotFound);
        }
        Ok(())
    }

    fn remove_exercise(&self, id: &domain::ExerciseID) -> Result<(), SqliteError> {
        let deleted = self.connection.execute(
            &format!("DELETE FROM {} WHERE id = ?1", Table::Exercises.as_ref()),
            [id.as_str()],
        )?;
        if deleted == 0 {
            return Err(SqliteError::NotFound);
        }
        Ok(())
    }

    fn workout_assignments(&self) -> Result<Vec<domain::WorkoutAssignment>, SqliteError> {
        let mut statement = self.connection.prepare(&format!(
            "SELECT id, workout_id, exercise_id FROM {} ORDER BY id",
            Table::WorkoutAssignments.as_ref()
        ))?;
        let assignments = statement
            .query_map([], |row| {
                Ok(domain::WorkoutAssignment {
                    id: row.get::<_, i64>(0)?.into(),
                    workout_id: row.get::<_, String>(1)?.into(),
                    exercise_id: row.get::<_, String>(2)?.into(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(assignments)
    }

    fn insert_workout_assignment(
        &self,
        workout_id: &domain::WorkoutID,
        exercise_id: &domain::ExerciseID,
    ) -> Result<domain::WorkoutAssignment, SqliteError> {
        self.connection.execute(
            &format!(
                "INSERT INTO {} (workout_id, exercise_id) VALUES (?1, ?2)",
                Table::WorkoutAssignments.as_ref()
            ),
            [workout_id.as_str(), exercise_id.as_str()],
        )?;
        Ok(domain::WorkoutAssignment {
            id: self.connection.last_insert_rowid().into(),
            workout_id: workout_id.clone(),
            exercise_id: exercise_id.clone(),
        })
    }
}

impl domain::ExerciseRepository for Sqlite {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        Ok(self.exercises()?)
    }

    async fn create_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::CreateError> {
        self.insert_exercise(&exercise)?;
        Ok(exercise)
    }

    async fn replace_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::UpdateError> {
        self.update_exercise(&exercise)?;
        Ok(self.exercise(&exercise.id)?)
    }

    async fn delete_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<domain::ExerciseID, domain::DeleteError> {
        self.remove_exercise(&id)?;
        Ok(id)
    }
}

impl domain::WorkoutAssignmentRepository for Sqlite {
    async fn read_workout_assignments(
        &self,
    ) -> Result<Vec<domain::WorkoutAssignment>, domain::ReadError> {
        Ok(self.workout_assignments()?)
    }

    async fn create_workout_assignment(
        &self,
        workout_id: domain::WorkoutID,
        exercise_id: domain::ExerciseID,
    ) -> Result<domain::WorkoutAssignment, domain::CreateError> {
        Ok(self.insert_workout_assignment(&workout_id, &exercise_id)?)
    }
}

const EXERCISE_COLUMNS: &str =
    "id, name, active, description, execution_technique, common_errors, muscle_group";

fn row_to_exercise(row: &Row) -> rusqlite::Result<domain::Exercise> {
    let name = row.get::<_, String>(1)?;
    let common_errors = row.get::<_, String>(5)?;
    Ok(domain::Exercise {
        id: row.get::<_, String>(0)?.into(),
        name: domain::Name::new(&name).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(err))
        })?,
        active: row.get(2)?,
        description: row.get(3)?,
        execution_technique: row.get(4)?,
        common_errors: serde_json::from_str(&common_errors).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(err))
        })?,
        muscle_group: row.get(6)?,
    })
}

#[derive(AsRefStr)]
enum Table {
    #[strum(serialize = "exercises")]
    Exercises,
    #[strum(serialize = "workout_assignments")]
    WorkoutAssignments,
}

#[derive(thiserror::Error, Debug)]
pub enum SqliteError {
    #[error("row not found")]
    NotFound,
    #[error("constraint violation: {0}")]
    Constraint(rusqlite::Error),
    #[error("database busy: {0}")]
    Busy(rusqlite::Error),
    #[error(transparent)]
    Sqlite(rusqlite::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for SqliteError {
    fn from(value: rusqlite::Error) -> Self {
        match value.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => SqliteError::Constraint(value),
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => SqliteError::Busy(value),
            _ => match value {
                rusqlite::Error::QueryReturnedNoRows => SqliteError::NotFound,
                value => SqliteError::Sqlite(value),
            },
        }
    }
}

impl From<SqliteError> for domain::StorageError {
    fn from(value: SqliteError) -> Self {
        match value {
            SqliteError::Busy(_) => domain::StorageError::Busy,
            value => domain::StorageError::Other(Box::new(value)),
        }
    }
}

impl From<SqliteError> for domain::ReadError {
    fn from(value: SqliteError) -> Self {
        domain::ReadError::Storage(value.into())
    }
}

impl From<SqliteError> for domain::CreateError {
    fn from(value: SqliteError) -> Self {
        match value {
            SqliteError::Constraint(_) => domain::CreateError::Conflict,
            value => domain::CreateError::Storage(value.into()),
        }
    }
}

impl From<SqliteError> for domain::UpdateError {
    fn from(value: SqliteError) -> Self {
        match value {
            SqliteError::NotFound => domain::UpdateError::NotFound,
            SqliteError::Constraint(_) => domain::UpdateError::Conflict,
            value => domain::UpdateError::Storage(value.into()),
        }
    }
}

impl From<SqliteError> for domain::DeleteError {
    fn from(value: SqliteError) -> Self {
        match value {
            SqliteError::NotFound => domain::DeleteError::NotFound,
            SqliteError::Constraint(_) => domain::DeleteError::Conflict,
            value => domain::DeleteError::Storage(value.into()),
        }
    }
}
