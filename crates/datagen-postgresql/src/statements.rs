//! SQL text for the lifecycle stages.

/// Table holding user records.
pub const USERS_TABLE: &str = "users";
/// Table holding product records.
pub const PRODUCTS_TABLE: &str = "products";

/// Quote an identifier for PostgreSQL, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Schema-qualified, quoted table name.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

/// Parameterized statements for one schema.
///
/// Parameters carry explicit casts so the driver binds `i64` ids and
/// `Decimal` prices without relying on the column types being inferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSql {
    pub insert_user: String,
    pub insert_product: String,
    pub update_user: String,
    pub update_product: String,
    pub delete_user: String,
    pub delete_product: String,
}

impl StageSql {
    pub fn for_schema(schema: &str) -> Self {
        let users = qualified_table(schema, USERS_TABLE);
        let products = qualified_table(schema, PRODUCTS_TABLE);
        Self {
            insert_user: format!(
                "INSERT INTO {users} (id, username, email_address) \
                 VALUES ($1::BIGINT, $2::TEXT, $3::TEXT)"
            ),
            insert_product: format!(
                "INSERT INTO {products} (id, name, description, price) \
                 VALUES ($1::BIGINT, $2::TEXT, $3::TEXT, $4::NUMERIC)"
            ),
            update_user: format!("UPDATE {users} SET username = $2::TEXT WHERE id = $1::BIGINT"),
            update_product: format!("UPDATE {products} SET name = $2::TEXT WHERE id = $1::BIGINT"),
            delete_user: format!("DELETE FROM {users} WHERE id = $1::BIGINT"),
            delete_product: format!("DELETE FROM {products} WHERE id = $1::BIGINT"),
        }
    }
}

/// Count rows with ids in `[$1, $2]`.
pub fn count_in_range_sql(schema: &str, table: &str) -> String {
    format!(
        "SELECT COUNT(*) FROM {} WHERE id BETWEEN $1::BIGINT AND $2::BIGINT",
        qualified_table(schema, table)
    )
}

/// Ids in `[$1, $2]`, ascending.
pub fn ids_in_range_sql(schema: &str, table: &str) -> String {
    format!(
        "SELECT id::BIGINT FROM {} WHERE id BETWEEN $1::BIGINT AND $2::BIGINT ORDER BY id",
        qualified_table(schema, table)
    )
}
