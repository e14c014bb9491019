use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 100;

/// skip/limit window for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    pub fn new(skip: usize, limit: usize) -> Result<Self> {
        if limit > MAX_LIMIT {
            return Err(Error::validation(format!(
                "limit must be at most {MAX_LIMIT}, got {limit}"
            )));
        }
        Ok(Self { skip, limit })
    }

    pub fn validated(self) -> Result<Self> {
        Self::new(self.skip, self.limit)
    }

    pub fn apply<T>(&self, items: impl Iterator<Item = T>) -> Vec<T> {
        items.skip(self.skip).take(self.limit).collect()
    }
}
