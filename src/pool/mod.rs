//! In-memory pool of flavor-text records.
//!
//! The pool is loaded once at startup and never grows. Every pick shuffles
//! the whole pool in place, so record order is not stable between calls.

mod loader;

pub use loader::{LoadError, load};

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use thiserror::Error;

/// One row of the message file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageRecord {
    pub title: String,
    pub message: String,
    /// The `final` column
    #[serde(rename = "final")]
    pub outcome: String,
}

#[derive(Error, Debug)]
pub enum PickError {
    #[error("Message pool is empty")]
    EmptyPool,
}

#[derive(Debug, Clone)]
pub struct MessagePool {
    records: Vec<MessageRecord>,
}

impl MessagePool {
    pub fn new(records: Vec<MessageRecord>) -> Result<Self, LoadError> {
        if records.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Current order of the pool. Changes after every [`MessagePool::pick`].
    #[cfg(test)]
    pub fn records(&self) -> &[MessageRecord] {
        &self.records
    }

    /// Shuffles the pool and returns the record that lands in front.
    pub fn pick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<MessageRecord, PickError> {
        self.records.shuffle(rng);
        self.records.first().cloned().ok_or(PickError::EmptyPool)
    }
}
