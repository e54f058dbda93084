use crate::config::SeedOptions;
use crate::schema::{DependencyResolver, Schema, Table};
use crate::SeedError;
use tracing::info;

/// Resolves which tables to populate based on include/exclude filters,
/// parents first
pub fn resolve_tables<'a>(
    schema: &'a Schema,
    options: &SeedOptions,
) -> Result<Vec<&'a Table>, SeedError> {
    let resolver = DependencyResolver::new(schema);

    match (options.include.is_empty(), options.exclude.is_empty()) {
        (false, false) => Err(SeedError::ConflictingFilters),
        (false, true) => {
            let refs: Vec<&str> = options.include.iter().map(|s| s.as_str()).collect();
            let tables = resolver.resolve_includes(&refs)?;
            info!(tables = ?refs, "including only requested tables");
            Ok(tables)
        }
        (true, false) => {
            let refs: Vec<&str> = options.exclude.iter().map(|s| s.as_str()).collect();
            let tables = resolver.resolve_excludes(&refs)?;
            info!(
                excluded = ?refs,
                remaining = tables.len(),
                "excluding tables"
            );
            Ok(tables)
        }
        (true, true) => {
            let tables = resolver.all_tables_ordered()?;
            info!(tables = tables.len(), "including all tables");
            Ok(tables)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ColumnType};

    fn schema() -> Schema {
        Schema::new(vec![
            Table::new(
                "audit_log",
                vec![Column::new("id", ColumnType::Integer).primary()],
            ),
            Table::new(
                "orders",
                vec![
                    Column::new("id", ColumnType::Integer).primary(),
                    Column::new("user_id", ColumnType::Integer).references("users", "id"),
                ],
            ),
            Table::new("users", vec![Column::new("id", ColumnType::Integer).primary()]),
        ])
    }

    fn names(tables: Vec<&Table>) -> Vec<&str> {
        tables.into_iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_exclude_list_drops_table() {
        let schema = schema();
        let options = SeedOptions::default().with_exclude(["audit_log"]);
        let tables = names(resolve_tables(&schema, &options).unwrap());
        assert_eq!(tables, ["users", "orders"]);
    }

    #[test]
    fn test_include_list_keeps_only_requested() {
        let schema = schema();
        let options = SeedOptions::default().with_include(["orders"]);
        assert_eq!(names(resolve_tables(&schema, &options).unwrap()), ["orders"]);
    }

    #[test]
    fn test_include_and_exclude_conflict() {
        let schema = schema();
        let options = SeedOptions::default()
            .with_include(["orders"])
            .with_exclude(["users"]);
        assert!(matches!(
            resolve_tables(&schema, &options),
            Err(SeedError::ConflictingFilters)
        ));
    }
}
