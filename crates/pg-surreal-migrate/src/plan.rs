//! Step ordering over the declared dependency graph.
//!
//! Turns the catalog's declarations into a total order in which every step
//! runs after the imports producing the documents it references. The order
//! is deterministic: among ready steps, declaration order wins.

use std::collections::HashMap;

use crate::error::{MigrateError, Result};
use crate::schema::Step;

/// Compute a total execution order for the given steps.
///
/// Fails with [`MigrateError::Plan`] when a step references a collection no
/// import produces, or when the declared dependencies form a cycle. Both
/// indicate a broken catalog rather than bad data.
pub fn plan(steps: &[Step]) -> Result<Vec<Step>> {
    let mut producers: HashMap<&str, usize> = HashMap::new();
    for (idx, step) in steps.iter().enumerate() {
        if let Some(collection) = step.produces() {
            if producers.insert(collection, idx).is_some() {
                return Err(MigrateError::Plan(format!(
                    "collection `{}` is produced by more than one import step",
                    collection
                )));
            }
        }
    }

    let mut deps: Vec<Vec<usize>> = Vec::with_capacity(steps.len());
    for step in steps {
        let mut indices = Vec::new();
        for collection in step.dependencies() {
            match producers.get(collection) {
                Some(&producer) => {
                    // A step cannot depend on itself; self-references would
                    // never become ready below.
                    if steps[producer].name() != step.name() {
                        indices.push(producer);
                    }
                }
                None => {
                    return Err(MigrateError::Plan(format!(
                        "step `{}` references collection `{}` that no import step produces",
                        step.name(),
                        collection
                    )));
                }
            }
        }
        deps.push(indices);
    }

    let mut placed = vec![false; steps.len()];
    let mut order = Vec::with_capacity(steps.len());
    loop {
        let next = (0..steps.len())
            .find(|&idx| !placed[idx] && deps[idx].iter().all(|&dep| placed[dep]));
        match next {
            Some(idx) => {
                placed[idx] = true;
                order.push(steps[idx]);
            }
            None => break,
        }
    }

    if order.len() != steps.len() {
        let stuck: Vec<_> = steps
            .iter()
            .enumerate()
            .filter(|(idx, _)| !placed[*idx])
            .map(|(_, step)| step.name())
            .collect();
        return Err(MigrateError::Plan(format!(
            "dependency cycle involving steps: {}",
            stuck.join(", ")
        )));
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{catalog, FieldKind, FieldMap, Step, TableSpec};
    use std::collections::HashMap;

    #[test]
    fn test_catalog_plans_cleanly() {
        let order = plan(&catalog()).unwrap();
        assert_eq!(order.len(), catalog().len());
    }

    #[test]
    fn test_every_step_runs_after_its_dependencies() {
        let order = plan(&catalog()).unwrap();
        let position: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(idx, step)| (step.name(), idx))
            .collect();

        for step in &order {
            for dep in step.dependencies() {
                if dep == step.name() {
                    continue;
                }
                assert!(
                    position[dep] < position[step.name()],
                    "step `{}` runs before its dependency `{}`",
                    step.name(),
                    dep
                );
            }
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        let first: Vec<_> = plan(&catalog()).unwrap().iter().map(|s| s.name()).collect();
        let second: Vec<_> = plan(&catalog()).unwrap().iter().map(|s| s.name()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_declaration_order_breaks_ties() {
        // country and language are both dependency-free; country is declared
        // first and must stay first.
        let order = plan(&catalog()).unwrap();
        let names: Vec<_> = order.iter().map(|s| s.name()).collect();
        assert_eq!(names[0], "country");
        let country = names.iter().position(|n| *n == "country").unwrap();
        let language = names.iter().position(|n| *n == "language").unwrap();
        assert!(country < language);
    }

    #[test]
    fn test_unknown_collection_is_rejected() {
        const ORPHAN_FIELDS: &[FieldMap] = &[FieldMap {
            column: "id",
            field: "id",
            kind: FieldKind::Scalar,
        },
        FieldMap {
            column: "ghost_id",
            field: "ghost_id",
            kind: FieldKind::Reference { target: "ghost" },
        }];
        static ORPHAN: TableSpec = TableSpec {
            collection: "orphan",
            source_table: "orphan",
            query: "select id, ghost_id from orphan",
            primary_key: "id",
            fields: ORPHAN_FIELDS,
        };

        let err = plan(&[Step::Import(&ORPHAN)]).unwrap_err();
        assert!(matches!(err, MigrateError::Plan(_)));
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_cycle_is_rejected() {
        const A_FIELDS: &[FieldMap] = &[
            FieldMap { column: "id", field: "id", kind: FieldKind::Scalar },
            FieldMap {
                column: "b_id",
                field: "b_id",
                kind: FieldKind::Reference { target: "b" },
            },
        ];
        const B_FIELDS: &[FieldMap] = &[
            FieldMap { column: "id", field: "id", kind: FieldKind::Scalar },
            FieldMap {
                column: "a_id",
                field: "a_id",
                kind: FieldKind::Reference { target: "a" },
            },
        ];
        static A: TableSpec = TableSpec {
            collection: "a",
            source_table: "a",
            query: "select id, b_id from a",
            primary_key: "id",
            fields: A_FIELDS,
        };
        static B: TableSpec = TableSpec {
            collection: "b",
            source_table: "b",
            query: "select id, a_id from b",
            primary_key: "id",
            fields: B_FIELDS,
        };

        let err = plan(&[Step::Import(&A), Step::Import(&B)]).unwrap_err();
        assert!(matches!(err, MigrateError::Plan(_)));
        assert!(err.to_string().contains("cycle"));
    }
}
