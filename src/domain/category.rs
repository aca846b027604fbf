use serde::{Deserialize, Serialize};

pub type CategoryId = u64;

/// A product category. Names are unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
}

impl CategoryCreate {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
}
