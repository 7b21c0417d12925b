//! Course category hierarchy.
//!
//! The [`CategoryHierarchy`] trait is the contract the balance calculator reads
//! ancestors through. [`CategoryTree`] is the in-memory implementation used by
//! the wallet tools and tests.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::CategoryId;

/// Errors that can occur while building a [`CategoryTree`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryError {
    /// The site level is implicit and cannot be inserted.
    #[error("category {0} is the site level and cannot be inserted")]
    SiteLevel(CategoryId),
    /// The category already exists.
    #[error("category {0} already exists")]
    Duplicate(CategoryId),
    /// The parent has not been inserted.
    #[error("parent category {parent} of {id} does not exist")]
    UnknownParent {
        /// The category being inserted.
        id: CategoryId,
        /// Its missing parent.
        parent: CategoryId,
    },
}

/// Read access to a category tree.
pub trait CategoryHierarchy {
    /// Whether the category exists.
    fn contains(&self, id: CategoryId) -> bool;

    /// Ancestors of `id`, site level first, `id` itself excluded.
    ///
    /// Returns `None` for an unknown category.
    fn ancestor_ids(&self, id: CategoryId) -> Option<Vec<CategoryId>>;

    /// The accounting "parents" of a category: the category itself and all its ancestors.
    ///
    /// The set iterates in ascending numeric id order.
    fn parents(&self, id: CategoryId) -> Option<BTreeSet<CategoryId>> {
        let mut parents: BTreeSet<CategoryId> = self.ancestor_ids(id)?.into_iter().collect();
        parents.insert(id);
        Some(parents)
    }
}

/// One `(id, parent)` edge, the serialized form of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    /// The category.
    pub id: CategoryId,
    /// Its parent; the site level for top-level categories.
    #[serde(default)]
    pub parent: CategoryId,
}

/// An in-memory category tree rooted at [`CategoryId::SITE`].
///
/// # Examples
///
/// ```
/// use enrolwallet_core::{CategoryHierarchy, CategoryId, CategoryTree};
///
/// let mut tree = CategoryTree::new();
/// tree.insert(CategoryId(9), CategoryId::SITE).unwrap();
/// tree.insert(CategoryId(2), CategoryId(9)).unwrap();
///
/// assert_eq!(
///     tree.ancestor_ids(CategoryId(2)),
///     Some(vec![CategoryId::SITE, CategoryId(9)])
/// );
/// assert_eq!(tree.ancestor_ids(CategoryId(5)), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CategoryNode>", into = "Vec<CategoryNode>")]
pub struct CategoryTree {
    parent_of: BTreeMap<CategoryId, CategoryId>,
}

impl CategoryTree {
    /// Create a tree holding only the site level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from edges given in any order.
    ///
    /// Edges are inserted once their parent is known; an edge whose parent never
    /// appears is reported as [`CategoryError::UnknownParent`].
    pub fn from_nodes(nodes: impl IntoIterator<Item = CategoryNode>) -> Result<Self, CategoryError> {
        let mut tree = Self::new();
        let mut pending: Vec<CategoryNode> = nodes.into_iter().collect();

        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();
            for node in pending {
                if tree.contains(node.parent) {
                    tree.insert(node.id, node.parent)?;
                } else {
                    deferred.push(node);
                }
            }
            if deferred.len() == before {
                let node = deferred[0];
                return Err(CategoryError::UnknownParent {
                    id: node.id,
                    parent: node.parent,
                });
            }
            pending = deferred;
        }

        Ok(tree)
    }

    /// Insert a category under an existing parent.
    pub fn insert(&mut self, id: CategoryId, parent: CategoryId) -> Result<(), CategoryError> {
        if id.is_site() {
            return Err(CategoryError::SiteLevel(id));
        }
        if self.parent_of.contains_key(&id) {
            return Err(CategoryError::Duplicate(id));
        }
        if !self.contains(parent) {
            return Err(CategoryError::UnknownParent { id, parent });
        }
        self.parent_of.insert(id, parent);
        Ok(())
    }

    /// Parent of a category; `None` for the site level and unknown ids.
    #[must_use]
    pub fn parent(&self, id: CategoryId) -> Option<CategoryId> {
        self.parent_of.get(&id).copied()
    }

    /// Number of categories below the site level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parent_of.len()
    }

    /// Check if the tree holds only the site level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent_of.is_empty()
    }

    /// All edges, ordered by category id.
    #[must_use]
    pub fn nodes(&self) -> Vec<CategoryNode> {
        self.parent_of
            .iter()
            .map(|(&id, &parent)| CategoryNode { id, parent })
            .collect()
    }
}

impl CategoryHierarchy for CategoryTree {
    fn contains(&self, id: CategoryId) -> bool {
        id.is_site() || self.parent_of.contains_key(&id)
    }

    fn ancestor_ids(&self, id: CategoryId) -> Option<Vec<CategoryId>> {
        if !self.contains(id) {
            return None;
        }

        let mut ancestors = Vec::new();
        let mut current = id;
        // insert() only links to existing parents, so the walk always ends at the site
        while let Some(parent) = self.parent(current) {
            ancestors.push(parent);
            current = parent;
        }
        ancestors.reverse();
        Some(ancestors)
    }
}

impl TryFrom<Vec<CategoryNode>> for CategoryTree {
    type Error = CategoryError;

    fn try_from(nodes: Vec<CategoryNode>) -> Result<Self, Self::Error> {
        Self::from_nodes(nodes)
    }
}

impl From<CategoryTree> for Vec<CategoryNode> {
    fn from(tree: CategoryTree) -> Self {
        tree.nodes()
    }
}
