use std::cmp::Ordering;

use derive_more::{AsRef, Display};

use crate::normalize;

#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq)]
pub struct Name(String);

impl Name {
    pub fn new(name: &str) -> Result<Self, NameError> {
        let trimmed_name = name.trim();

        if trimmed_name.is_empty() {
            return Err(NameError::Empty);
        }

        let len = trimmed_name.chars().count();

        if len > 128 {
            return Err(NameError::TooLong(len));
        }

        Ok(Name(trimmed_name.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Catalog order: names are compared ignoring case, accents and punctuation first. Accents
/// break ties before case, and lowercase sorts before uppercase.
impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        normalize(&self.0)
            .cmp(&normalize(&other.0))
            .then_with(|| self.0.to_lowercase().cmp(&other.0.to_lowercase()))
            .then_with(|| {
                self.0
                    .chars()
                    .map(char::is_uppercase)
                    .cmp(other.0.chars().map(char::is_uppercase))
            })
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,
    #[error("Name must be 128 characters or fewer ({0} > 128)")]
    TooLong(usize),
}
