//! Build plan construction
//!
//! Merges the closures of all requested packages into one ordered,
//! duplicate-free list of packages to build.

use std::collections::HashSet;

use serde::Serialize;

use crate::core::packages::DependencyTable;
use crate::core::resolver::Resolver;
use crate::error::ResolverError;

/// What the user asked to build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildRequest {
    /// Every package, in the table's default order
    All,
    /// The named packages and their prerequisites, in request order
    Packages(Vec<String>),
}

/// Ordered, duplicate-free sequence of packages to build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
    packages: Vec<String>,
}

impl BuildPlan {
    /// Plan for a request
    pub fn from_request(
        table: &DependencyTable,
        request: &BuildRequest,
    ) -> Result<Self, ResolverError> {
        match request {
            BuildRequest::All => Ok(Self::all(table)),
            BuildRequest::Packages(names) => Self::for_packages(table, names),
        }
    }

    /// Plan covering every package in the table's default order
    ///
    /// The default order is already dependency-safe, so nothing is resolved.
    pub fn all(table: &DependencyTable) -> Self {
        Self {
            packages: dedup_first_occurrence(table.default_order().iter().cloned()),
        }
    }

    /// Plan for explicitly requested packages
    ///
    /// Closures are concatenated in request order and only the first
    /// occurrence of each package is kept. Prerequisites already planned are
    /// not expanded again.
    pub fn for_packages<S: AsRef<str>>(
        table: &DependencyTable,
        requested: &[S],
    ) -> Result<Self, ResolverError> {
        let resolver = Resolver::new(table);
        let mut planned = HashSet::new();
        let mut packages = Vec::new();
        for name in requested {
            resolver.resolve_into(name.as_ref(), &mut planned, &mut packages)?;
        }

        Ok(Self { packages })
    }

    /// Packages in build order
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Iterate over packages in build order
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.packages.iter()
    }

    /// Number of packages in the plan
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the plan is empty
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Index of `name` in the plan
    pub fn position(&self, name: &str) -> Option<usize> {
        self.packages.iter().position(|p| p == name)
    }
}

impl<'a> IntoIterator for &'a BuildPlan {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn dedup_first_occurrence(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
