//! Dependency resolution
//!
//! Expands a requested package into its closure (every transitive
//! prerequisite, prerequisites first) and computes a whole-table build order.

use std::collections::HashSet;

use crate::core::packages::DependencyTable;
use crate::error::ResolverError;

/// Closure resolver over a dependency table
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    table: &'a DependencyTable,
}

impl<'a> Resolver<'a> {
    /// Create a resolver for `table`
    pub fn new(table: &'a DependencyTable) -> Self {
        Self { table }
    }

    /// Compute the closure of `name`
    ///
    /// Each prerequisite's closure is emitted, in declared order, before the
    /// package itself, so the package is always last. Shared prerequisites
    /// (diamonds) appear once per path; deduplication happens in the plan.
    ///
    /// A name missing from the table is returned unexpanded.
    pub fn resolve(&self, name: &str) -> Result<Vec<String>, ResolverError> {
        if !self.table.contains(name) {
            tracing::warn!("Package '{name}' is not in the dependency table, building it as-is");
            return Ok(vec![name.to_string()]);
        }

        let mut closure = Vec::new();
        let mut visiting = Vec::new();
        self.expand(name, &mut visiting, &mut closure)?;
        Ok(closure)
    }

    fn expand(
        &self,
        node: &str,
        visiting: &mut Vec<String>,
        closure: &mut Vec<String>,
    ) -> Result<(), ResolverError> {
        if let Some(start) = visiting.iter().position(|n| n == node) {
            let mut cycle = visiting[start..].to_vec();
            cycle.push(node.to_string());
            return Err(ResolverError::CircularDependency { cycle });
        }

        visiting.push(node.to_string());
        if let Some(deps) = self.table.lookup(node) {
            for dep in deps {
                self.expand(dep, visiting, closure)?;
            }
        }
        visiting.pop();

        closure.push(node.to_string());
        Ok(())
    }

    /// Append the closure of `name` to `plan`, skipping packages in `planned`
    ///
    /// Produces what appending [`Self::resolve`] and keeping only first
    /// occurrences would, but never walks below a package already planned.
    /// Work is linear in the number of dependency edges.
    pub fn resolve_into(
        &self,
        name: &str,
        planned: &mut HashSet<String>,
        plan: &mut Vec<String>,
    ) -> Result<(), ResolverError> {
        if !self.table.contains(name) {
            tracing::warn!("Package '{name}' is not in the dependency table, building it as-is");
            if planned.insert(name.to_string()) {
                plan.push(name.to_string());
            }
            return Ok(());
        }

        let mut visiting = Vec::new();
        self.extend(name, &mut visiting, planned, plan)
    }

    fn extend(
        &self,
        node: &str,
        visiting: &mut Vec<String>,
        planned: &mut HashSet<String>,
        plan: &mut Vec<String>,
    ) -> Result<(), ResolverError> {
        if planned.contains(node) {
            return Ok(());
        }

        if let Some(start) = visiting.iter().position(|n| n == node) {
            let mut cycle = visiting[start..].to_vec();
            cycle.push(node.to_string());
            return Err(ResolverError::CircularDependency { cycle });
        }

        visiting.push(node.to_string());
        if let Some(deps) = self.table.lookup(node) {
            for dep in deps {
                self.extend(dep, visiting, planned, plan)?;
            }
        }
        visiting.pop();

        planned.insert(node.to_string());
        plan.push(node.to_string());
        Ok(())
    }

    /// Compute a build order covering every package in the table
    ///
    /// Packages are visited in name order, so the result is deterministic.
    pub fn topological_order(&self) -> Result<Vec<String>, ResolverError> {
        let mut visited = HashSet::new();
        let mut temp_visited = HashSet::new();
        let mut result = Vec::new();
        let mut cycle_path = Vec::new();

        for node in self.table.names() {
            if !visited.contains(node) {
                self.visit(
                    node,
                    &mut visited,
                    &mut temp_visited,
                    &mut result,
                    &mut cycle_path,
                )?;
            }
        }

        Ok(result)
    }

    fn visit(
        &self,
        node: &str,
        visited: &mut HashSet<String>,
        temp_visited: &mut HashSet<String>,
        result: &mut Vec<String>,
        cycle_path: &mut Vec<String>,
    ) -> Result<(), ResolverError> {
        if temp_visited.contains(node) {
            let start = cycle_path.iter().position(|n| n == node).unwrap_or(0);
            let mut cycle = cycle_path[start..].to_vec();
            cycle.push(node.to_string());
            return Err(ResolverError::CircularDependency { cycle });
        }

        if visited.contains(node) {
            return Ok(());
        }

        temp_visited.insert(node.to_string());
        cycle_path.push(node.to_string());

        if let Some(deps) = self.table.lookup(node) {
            for dep in deps {
                self.visit(dep, visited, temp_visited, result, cycle_path)?;
            }
        }

        cycle_path.pop();
        temp_visited.remove(node);
        visited.insert(node.to_string());
        result.push(node.to_string());

        Ok(())
    }

    /// Whether `dependency` is a transitive prerequisite of `package`
    pub fn requires(&self, package: &str, dependency: &str) -> bool {
        let mut stack = vec![package];
        let mut seen = HashSet::new();

        while let Some(current) = stack.pop() {
            for dep in self.table.lookup(current).unwrap_or_default() {
                if dep == dependency {
                    return true;
                }
                if seen.insert(dep.as_str()) {
                    stack.push(dep.as_str());
                }
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::MIN_PROPTEST_ITERATIONS;
    use crate::test_utils::{generators, table_from};
    use proptest::prelude::*;

    fn scenario_table() -> DependencyTable {
        table_from(&[
            ("casa", &[]),
            ("tables", &["casa"]),
            ("measures", &["tables", "scimath"]),
            ("scimath", &["casa"]),
        ])
    }

    #[test]
    fn test_leaf_closure_is_itself() {
        let table = scenario_table();
        let closure = Resolver::new(&table).resolve("casa").unwrap();
        assert_eq!(closure, vec!["casa"]);
    }

    #[test]
    fn test_closure_keeps_declared_order_and_diamonds() {
        let table = scenario_table();
        let closure = Resolver::new(&table).resolve("measures").unwrap();
        assert_eq!(closure, vec!["casa", "tables", "casa", "scimath", "measures"]);
    }

    #[test]
    fn test_unknown_package_is_passed_through() {
        let table = scenario_table();
        let closure = Resolver::new(&table).resolve("python").unwrap();
        assert_eq!(closure, vec!["python"]);
    }

    #[test]
    fn test_resolve_into_skips_planned_packages() {
        let table = scenario_table();
        let resolver = Resolver::new(&table);
        let mut planned = HashSet::from(["tables".to_string()]);
        let mut plan = Vec::new();

        resolver.resolve_into("measures", &mut planned, &mut plan).unwrap();
        resolver.resolve_into("derived", &mut planned, &mut plan).unwrap();
        resolver.resolve_into("derived", &mut planned, &mut plan).unwrap();

        assert_eq!(plan, ["casa", "scimath", "measures", "derived"]);
    }

    #[test]
    fn test_casacore_images_closure() {
        let table = DependencyTable::casacore();
        let resolver = Resolver::new(&table);
        let closure = resolver.resolve("images").unwrap();

        assert_eq!(closure.last().map(String::as_str), Some("images"));
        for dep in [
            "casa",
            "tables",
            "scimath",
            "measures",
            "fits",
            "coordinates",
            "components",
            "mirlib",
        ] {
            assert!(closure.iter().any(|p| p == dep), "closure should contain {dep}");
        }
        assert!(!closure.iter().any(|p| p == "ms"));
    }

    #[test]
    fn test_simple_dependency_order() {
        let table = table_from(&[("app", &["lib"]), ("lib", &[])]);

        let order = Resolver::new(&table).topological_order().unwrap();
        let lib_pos = order.iter().position(|x| x == "lib").unwrap();
        let app_pos = order.iter().position(|x| x == "app").unwrap();

        assert!(lib_pos < app_pos, "lib should be built before app");
    }

    #[test]
    fn test_requires_is_transitive() {
        let table = scenario_table();
        let resolver = Resolver::new(&table);

        assert!(resolver.requires("measures", "casa"));
        assert!(resolver.requires("tables", "casa"));
        assert!(!resolver.requires("casa", "tables"));
        assert!(!resolver.requires("tables", "scimath"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(MIN_PROPTEST_ITERATIONS))]

        /// Every transitive prerequisite precedes the package, which comes last
        #[test]
        fn prop_closure_lists_prerequisites_first(table in generators::dag_table()) {
            let resolver = Resolver::new(&table);

            for package in table.names() {
                let closure = resolver.resolve(package).unwrap();
                prop_assert_eq!(closure.last().map(String::as_str), Some(package));
                prop_assert_eq!(closure.iter().filter(|p| *p == package).count(), 1);

                for other in table.names() {
                    if resolver.requires(package, other) {
                        prop_assert!(closure.iter().any(|p| p == other));
                    }
                }

                for (i, earlier) in closure.iter().enumerate() {
                    for later in &closure[i + 1..] {
                        prop_assert!(
                            !resolver.requires(earlier, later) || closure[..=i].contains(later),
                            "{} appears before its prerequisite {}", earlier, later
                        );
                    }
                }
            }
        }
    }
}
