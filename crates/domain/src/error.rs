type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] BoxError),
}

#[derive(thiserror::Error, Debug)]
pub enum CreateError {
    #[error("conflict")]
    Conflict,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] BoxError),
}

#[derive(thiserror::Error, Debug)]
pub enum UpdateError {
    #[error("not found")]
    NotFound,
    #[error("conflict")]
    Conflict,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] BoxError),
}

#[derive(thiserror::Error, Debug)]
pub enum DeleteError {
    #[error("not found")]
    NotFound,
    #[error("conflict")]
    Conflict,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] BoxError),
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("database busy")]
    Busy,
    #[error(transparent)]
    Other(#[from] BoxError),
}

impl From<UpdateError> for CreateError {
    fn from(value: UpdateError) -> Self {
        match value {
            UpdateError::NotFound => CreateError::Other("not found".into()),
            UpdateError::Conflict => CreateError::Conflict,
            UpdateError::Storage(storage) => CreateError::Storage(storage),
            UpdateError::Other(other) => CreateError::Other(other),
        }
    }
}

/// Failure of a single mutation while resolving a duplicate pair.
#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("failed to deactivate: {0}")]
    Update(#[from] UpdateError),
    #[error("failed to delete: {0}")]
    Delete(#[from] DeleteError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_error_from_update_error() {
        assert!(matches!(
            CreateError::from(UpdateError::Conflict),
            CreateError::Conflict
        ));
        assert!(matches!(
            CreateError::from(UpdateError::Storage(StorageError::Busy)),
            CreateError::Storage(StorageError::Busy)
        ));
        assert!(matches!(
            CreateError::from(UpdateError::NotFound),
            CreateError::Other(error) if error.to_string() == "not found"
        ));
        assert!(matches!(
            CreateError::from(UpdateError::Other("foo".into())),
            CreateError::Other(error) if error.to_string() == "foo"
        ));
    }

    #[test]
    fn test_resolve_error_display() {
        assert_eq!(
            ResolveError::from(UpdateError::NotFound).to_string(),
            "failed to deactivate: not found"
        );
        assert_eq!(
            ResolveError::from(DeleteError::Conflict).to_string(),
            "failed to delete: conflict"
        );
        assert_eq!(
            ResolveError::from(DeleteError::Storage(StorageError::Busy)).to_string(),
            "failed to delete: database busy"
        );
    }
}
