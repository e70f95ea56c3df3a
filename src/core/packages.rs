//! Package dependency table
//!
//! Maps every known package to its direct prerequisites. The built-in table
//! describes the casacore package set; projects may supply their own through
//! the settings file.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::core::resolver::Resolver;
use crate::error::ResolverError;

/// Built-in casacore packages and their direct prerequisites
const CASACORE_PACKAGES: &[(&str, &[&str])] = &[
    ("casa", &[]),
    ("tables", &["casa"]),
    ("mirlib", &["casa"]),
    ("scimath", &["casa"]),
    ("measures", &["tables", "scimath"]),
    ("fits", &["measures"]),
    ("coordinates", &["fits"]),
    ("components", &["coordinates"]),
    ("lattices", &["tables", "scimath"]),
    ("ms", &["measures"]),
    ("images", &["components", "mirlib"]),
    ("msfits", &["ms", "fits"]),
    ("msvis", &["ms"]),
];

/// Order used when every casacore package is built
const CASACORE_BUILD_ORDER: &[&str] = &[
    "casa",
    "tables",
    "mirlib",
    "scimath",
    "measures",
    "fits",
    "lattices",
    "coordinates",
    "components",
    "images",
    "ms",
    "msvis",
    "msfits",
];

/// Immutable package -> prerequisites mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyTable {
    /// Direct prerequisites in declared order
    depends: BTreeMap<String, Vec<String>>,
    /// Hand-maintained, dependency-safe order of every top-level package
    default_order: Vec<String>,
}

impl DependencyTable {
    /// The built-in casacore table
    pub fn casacore() -> Self {
        let depends = CASACORE_PACKAGES
            .iter()
            .map(|(name, deps)| {
                (
                    (*name).to_string(),
                    deps.iter().map(|d| (*d).to_string()).collect(),
                )
            })
            .collect();

        Self {
            depends,
            default_order: CASACORE_BUILD_ORDER.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Build a validated table
    ///
    /// When `default_order` is `None` the table's topological order is used.
    ///
    /// # Errors
    ///
    /// Fails when a prerequisite is not itself a table entry, when the graph
    /// has a cycle, or when the default order is unknown or unsafe.
    pub fn new(
        depends: BTreeMap<String, Vec<String>>,
        default_order: Option<Vec<String>>,
    ) -> Result<Self, ResolverError> {
        let mut table = Self {
            depends,
            default_order: Vec::new(),
        };

        for (package, deps) in &table.depends {
            if let Some(missing) = deps.iter().find(|d| !table.depends.contains_key(*d)) {
                return Err(ResolverError::MissingDependency {
                    package: package.clone(),
                    dependency: missing.clone(),
                });
            }
        }

        let topological = Resolver::new(&table).topological_order()?;
        table.default_order = match default_order {
            Some(order) => {
                table.check_order(&order)?;
                order
            }
            None => topological,
        };

        Ok(table)
    }

    /// Direct prerequisites of `name`, or `None` for an unknown package
    pub fn lookup(&self, name: &str) -> Option<&[String]> {
        self.depends.get(name).map(Vec::as_slice)
    }

    /// Whether `name` is a known package
    pub fn contains(&self, name: &str) -> bool {
        self.depends.contains_key(name)
    }

    /// All known package names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.depends.keys().map(String::as_str)
    }

    /// Order used for "build everything"
    pub fn default_order(&self) -> &[String] {
        &self.default_order
    }

    /// Number of known packages
    pub fn len(&self) -> usize {
        self.depends.len()
    }

    /// Whether the table has no packages
    pub fn is_empty(&self) -> bool {
        self.depends.is_empty()
    }

    /// Check that `order` only names known packages and lists every
    /// prerequisite of a listed package before it.
    fn check_order(&self, order: &[String]) -> Result<(), ResolverError> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for (i, name) in order.iter().enumerate() {
            positions.entry(name.as_str()).or_insert(i);
        }

        let mut seen = HashSet::new();
        for (index, package) in order.iter().enumerate() {
            let deps = self
                .lookup(package)
                .ok_or_else(|| ResolverError::UnknownPackage {
                    name: package.clone(),
                })?;

            if !seen.insert(package.as_str()) {
                continue;
            }

            for dep in deps {
                match positions.get(dep.as_str()) {
                    Some(&pos) if pos < index => {}
                    _ => {
                        return Err(ResolverError::UnsafeOrder {
                            package: package.clone(),
                            dependency: dep.clone(),
                        })
                    }
                }
            }
        }

        Ok(())
    }
}

impl Default for DependencyTable {
    fn default() -> Self {
        Self::casacore()
    }
}
