//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

use std::collections::BTreeMap;

use crate::core::packages::DependencyTable;

/// Build a validated table from `(name, prerequisites)` pairs
pub fn table_from(entries: &[(&str, &[&str])]) -> DependencyTable {
    let depends: BTreeMap<String, Vec<String>> = entries
        .iter()
        .map(|(name, deps)| {
            (
                (*name).to_string(),
                deps.iter().map(|d| (*d).to_string()).collect(),
            )
        })
        .collect();
    DependencyTable::new(depends, None).expect("test table must be a valid DAG")
}

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    use crate::core::packages::DependencyTable;

    /// Generate a valid package name (lowercase alphanumeric)
    pub fn package_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9]{0,11}"
    }

    /// Generate an acyclic dependency table
    ///
    /// Package `i` may only depend on packages with a lower index, which
    /// rules out cycles. Prerequisite lists keep a random declared order.
    pub fn dag_table() -> impl Strategy<Value = DependencyTable> {
        (1usize..12)
            .prop_flat_map(|count| {
                let edges = (0..count)
                    .map(|i| {
                        if i == 0 {
                            Just(Vec::new()).boxed()
                        } else {
                            proptest::sample::subsequence((0..i).collect::<Vec<_>>(), 0..=i.min(4))
                                .prop_shuffle()
                                .boxed()
                        }
                    })
                    .collect::<Vec<_>>();
                (Just(count), edges)
            })
            .prop_map(|(count, edges)| {
                let name = |i: usize| format!("pkg{i}");
                let depends: BTreeMap<String, Vec<String>> = (0..count)
                    .map(|i| (name(i), edges[i].iter().map(|&d| name(d)).collect()))
                    .collect();
                DependencyTable::new(depends, None).expect("generated table is acyclic")
            })
    }

    /// Generate a table together with a request drawn from its packages,
    /// possibly repeating names and including an unknown one
    pub fn table_and_request() -> impl Strategy<Value = (DependencyTable, Vec<String>)> {
        dag_table().prop_flat_map(|table| {
            let mut candidates: Vec<String> = table.names().map(String::from).collect();
            candidates.push("unknown".to_string());
            let request = proptest::collection::vec(proptest::sample::select(candidates), 0..6);
            (Just(table), request)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use crate::config::defaults::MIN_PROPTEST_ITERATIONS;
    use crate::core::resolver::Resolver;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(MIN_PROPTEST_ITERATIONS))]

        #[test]
        fn test_package_name_generator(name in package_name()) {
            prop_assert!(!name.is_empty());
            prop_assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }

        #[test]
        fn test_dag_table_generator_is_acyclic(table in dag_table()) {
            prop_assert!(!table.is_empty());
            prop_assert!(Resolver::new(&table).topological_order().is_ok());
            prop_assert_eq!(table.default_order().len(), table.len());
        }
    }
}
