use super::types::{Schema, Table};
use crate::SeedError;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Orders tables so that foreign-key parents come before their children
pub struct DependencyResolver<'a> {
    schema: &'a Schema,
    /// Map of table name -> tables it depends on (self-references removed)
    deps: HashMap<&'a str, BTreeSet<&'a str>>,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        let deps = schema
            .tables()
            .iter()
            .map(|table| {
                let parents = table
                    .dependencies()
                    .into_iter()
                    // Self-references (e.g. categories.parent_id -> categories) don't order anything
                    .filter(|dep| *dep != table.name)
                    .collect();
                (table.name.as_str(), parents)
            })
            .collect();

        Self { schema, deps }
    }

    /// Tables this table must be populated after
    pub fn parents(&self, name: &str) -> Vec<&'a str> {
        self.deps
            .get(name)
            .map(|deps| deps.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Only the requested tables, in dependency order
    pub fn resolve_includes(&self, requested: &[&str]) -> Result<Vec<&'a Table>, SeedError> {
        let mut included: HashSet<&str> = HashSet::new();
        for name in requested {
            let table = self
                .schema
                .table(name)
                .ok_or_else(|| SeedError::UnknownTable(name.to_string()))?;
            included.insert(table.name.as_str());
        }

        self.topological_sort(&included)
    }

    /// Every table except the excluded ones, in dependency order
    pub fn resolve_excludes(&self, excluded: &[&str]) -> Result<Vec<&'a Table>, SeedError> {
        for name in excluded {
            if self.schema.table(name).is_none() {
                return Err(SeedError::UnknownTable(name.to_string()));
            }
        }

        let excluded: HashSet<&str> = excluded.iter().copied().collect();
        let included: HashSet<&str> = self
            .schema
            .tables()
            .iter()
            .map(|t| t.name.as_str())
            .filter(|name| !excluded.contains(name))
            .collect();

        self.topological_sort(&included)
    }

    /// Return all tables in dependency order
    pub fn all_tables_ordered(&self) -> Result<Vec<&'a Table>, SeedError> {
        self.resolve_excludes(&[])
    }

    /// Depth-first topological sort. Dependencies outside `included` are not
    /// followed, but a cycle through included tables is always an error.
    fn topological_sort(&self, included: &HashSet<&str>) -> Result<Vec<&'a Table>, SeedError> {
        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut path: Vec<&str> = Vec::new();

        // Walk in schema order so the output is stable between runs
        for table in self.schema.tables() {
            let name = table.name.as_str();
            if included.contains(name) && !visited.contains(name) {
                self.visit(name, included, &mut visited, &mut path, &mut result)?;
            }
        }

        Ok(result)
    }

    fn visit(
        &self,
        name: &'a str,
        included: &HashSet<&str>,
        visited: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
        result: &mut Vec<&'a Table>,
    ) -> Result<(), SeedError> {
        if let Some(start) = path.iter().position(|n| *n == name) {
            let mut chain: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
            chain.push(name.to_string());
            return Err(SeedError::CircularDependency { chain });
        }
        if visited.contains(name) {
            return Ok(());
        }

        path.push(name);

        if let Some(deps) = self.deps.get(name) {
            for dep in deps {
                if included.contains(dep) {
                    self.visit(*dep, included, visited, path, result)?;
                }
            }
        }

        path.pop();
        visited.insert(name);

        if let Some(table) = self.schema.table(name) {
            result.push(table);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ColumnType};

    fn table(name: &str, parents: &[&str]) -> Table {
        let mut columns = vec![Column::new("id", ColumnType::Integer).primary()];
        for parent in parents {
            columns.push(
                Column::new(format!("{parent}_id"), ColumnType::Integer).references(*parent, "id"),
            );
        }
        Table::new(name, columns)
    }

    fn names(tables: &[&Table]) -> Vec<String> {
        tables.iter().map(|t| t.name.clone()).collect()
    }

    #[test]
    fn test_parents_come_before_children() {
        let schema = Schema::new(vec![
            table("order_items", &["orders", "products"]),
            table("orders", &["users"]),
            table("products", &[]),
            table("users", &[]),
        ]);
        let resolver = DependencyResolver::new(&schema);
        let ordered = names(&resolver.all_tables_ordered().unwrap());

        let pos = |n: &str| ordered.iter().position(|t| t == n).unwrap();
        assert_eq!(ordered.len(), 4);
        assert!(pos("users") < pos("orders"));
        assert!(pos("orders") < pos("order_items"));
        assert!(pos("products") < pos("order_items"));
    }

    #[test]
    fn test_self_reference_is_not_a_cycle() {
        let schema = Schema::new(vec![table("categories", &["categories"])]);
        let resolver = DependencyResolver::new(&schema);
        assert_eq!(names(&resolver.all_tables_ordered().unwrap()), ["categories"]);
    }

    #[test]
    fn test_cycle_reports_chain() {
        let schema = Schema::new(vec![
            table("a", &["b"]),
            table("b", &["c"]),
            table("c", &["a"]),
        ]);
        let resolver = DependencyResolver::new(&schema);

        match resolver.all_tables_ordered() {
            Err(SeedError::CircularDependency { chain }) => {
                assert_eq!(chain, ["a", "b", "c", "a"]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_excluding_a_cycle_member_breaks_it() {
        let schema = Schema::new(vec![table("a", &["b"]), table("b", &["a"])]);
        let resolver = DependencyResolver::new(&schema);
        assert_eq!(names(&resolver.resolve_excludes(&["b"]).unwrap()), ["a"]);
    }

    #[test]
    fn test_unknown_table_error() {
        let schema = Schema::new(vec![table("users", &[])]);
        let resolver = DependencyResolver::new(&schema);
        assert!(matches!(
            resolver.resolve_includes(&["nonexistent"]),
            Err(SeedError::UnknownTable(_))
        ));
        assert!(resolver.resolve_excludes(&["nonexistent"]).is_err());
    }
}
