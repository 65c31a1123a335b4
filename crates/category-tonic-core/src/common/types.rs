//! # Category Domain Types
//!
//! The types stores and handlers exchange, kept separate from the generated
//! wire messages so store implementations never depend on `prost`.
//!
//! - [`CategoryId`] - The store-assigned identifier.
//! - [`NewCategory`] - Creation input; carries no id.
//! - [`Category`] - A persisted record.
//!
//! Ids are assigned exclusively by the store. Nothing in this crate generates
//! or mutates them.

use crate::proto;

/// Identifier assigned by the store at creation time.
pub type CategoryId = i64;

/// Input for a store `create` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
}

impl NewCategory {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A category as persisted by the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
}

impl Category {
    /// Attaches a store-assigned id to a creation input.
    pub fn from_new(id: CategoryId, new: NewCategory) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
        }
    }
}

impl From<proto::CreateCategoryRequest> for NewCategory {
    fn from(req: proto::CreateCategoryRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
        }
    }
}

impl From<Category> for proto::Category {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
        }
    }
}

impl From<proto::Category> for Category {
    fn from(category: proto::Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
        }
    }
}

impl FromIterator<Category> for proto::CategoryList {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        Self {
            categories: iter.into_iter().map(proto::Category::from).collect(),
        }
    }
}
