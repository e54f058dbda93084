/// Quote an identifier for use in SQL, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Generate an INSERT statement for the given columns, or a DEFAULT VALUES
/// insert when no column has a value
pub fn generate_insert(table: &str, columns: &[&str]) -> String {
    if columns.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table));
    }

    let names: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        names.join(", "),
        placeholders(columns.len())
    )
}

/// Generate a query matching a row whose columns all equal the bound values
/// (NULL-safe, via `IS`)
pub fn generate_lookup(table: &str, columns: &[&str]) -> String {
    let conditions: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} IS ?{}", quote_ident(c), i + 1))
        .collect();

    format!(
        "SELECT 1 FROM {} WHERE {} LIMIT 1",
        quote_ident(table),
        conditions.join(" AND ")
    )
}

/// Generate a query listing the distinct non-NULL values of a column
pub fn generate_select_values(table: &str, column: &str) -> String {
    let column = quote_ident(column);
    format!(
        "SELECT DISTINCT {col} FROM {} WHERE {col} IS NOT NULL",
        quote_ident(table),
        col = column
    )
}

/// Generate a query that returns a row when a column holds any non-NULL value
pub fn generate_any_value(table: &str, column: &str) -> String {
    format!(
        "SELECT 1 FROM {} WHERE {} IS NOT NULL LIMIT 1",
        quote_ident(table),
        quote_ident(column)
    )
}

/// Generate a query for the largest integer stored in a column
pub fn generate_max_integer(table: &str, column: &str) -> String {
    let column = quote_ident(column);
    format!(
        "SELECT MAX({col}) FROM {} WHERE typeof({col}) = 'integer'",
        quote_ident(table),
        col = column
    )
}
