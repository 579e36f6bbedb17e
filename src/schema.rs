//! Table metadata definitions.
//!
//! The compiler consumes table metadata through [`TableDef`]: an attribute
//! list with key/type/nullability/default/comment, plus the fully-qualified
//! table name. Definitions load from JSON or are built in code.
//!
//! # Example
//! ```
//! use relvar::schema::Schema;
//!
//! let json = r#"{
//!     "tables": [{
//!         "name": "users",
//!         "columns": [
//!             { "name": "id", "type": "int", "primary_key": true },
//!             { "name": "email", "type": "varchar" }
//!         ]
//!     }]
//! }"#;
//!
//! let schema: Schema = serde_json::from_str(json).unwrap();
//! let users = schema.table("users").unwrap();
//! assert_eq!(users.header().primary_key(), vec!["id"]);
//! ```

use serde::{Deserialize, Serialize};

use crate::header::{quote, Attribute, Header, SqlType};

/// Database schema definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    pub tables: Vec<TableDef>,
}

/// Table definition with columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,
    /// Database/schema qualifier, if the table is not in the default one.
    #[serde(default)]
    pub database: Option<String>,
    pub columns: Vec<ColumnDef>,
}

/// Column definition with type information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type", alias = "typ")]
    pub typ: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub comment: String,
}

impl ColumnDef {
    /// Map the declared column type onto the compiler's type tags.
    pub fn sql_type(&self) -> SqlType {
        let typ = self.typ.to_lowercase();
        if typ.contains("blob") || typ.contains("binary") {
            SqlType::Blob
        } else if typ.starts_with("int")
            || typ.ends_with("int")
            || matches!(
                typ.as_str(),
                "decimal" | "numeric" | "float" | "double" | "real" | "bool" | "boolean" | "bit"
            )
        {
            SqlType::Numeric
        } else if typ.contains("char")
            || typ.contains("text")
            || matches!(
                typ.as_str(),
                "date" | "datetime" | "timestamp" | "time" | "year" | "enum" | "set" | "json" | "uuid"
            )
        {
            SqlType::Text
        } else {
            SqlType::Other
        }
    }
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Add a table to the schema.
    pub fn add_table(&mut self, table: TableDef) {
        self.tables.push(table);
    }

    /// Look up a table definition by name.
    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Load schema from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl TableDef {
    /// Create a new table definition.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            database: None,
            columns: Vec::new(),
        }
    }

    /// Builder: qualify the table with a database name.
    pub fn in_database(mut self, database: &str) -> Self {
        self.database = Some(database.to_string());
        self
    }

    /// Builder: add a simple column.
    pub fn column(mut self, name: &str, typ: &str) -> Self {
        self.columns.push(ColumnDef {
            name: name.to_string(),
            typ: typ.to_string(),
            nullable: true,
            primary_key: false,
            default: None,
            comment: String::new(),
        });
        self
    }

    /// Builder: add a primary key column.
    pub fn pk(mut self, name: &str, typ: &str) -> Self {
        self.columns.push(ColumnDef {
            name: name.to_string(),
            typ: typ.to_string(),
            nullable: false,
            primary_key: true,
            default: None,
            comment: String::new(),
        });
        self
    }

    /// Builder: add a blob column.
    pub fn blob(mut self, name: &str) -> Self {
        self.column(name, "blob")
    }

    /// The header this table supplies to a leaf node.
    pub fn header(&self) -> Header {
        Header::new(
            self.columns
                .iter()
                .map(|c| Attribute {
                    name: c.name.clone(),
                    sql_type: c.sql_type(),
                    is_key: c.primary_key,
                    nullable: c.nullable,
                    default: c.default.clone(),
                    comment: c.comment.clone(),
                    alias: None,
                    computed: false,
                })
                .collect(),
        )
    }

    /// The fully-qualified, quoted table name.
    pub fn qualified_name(&self) -> String {
        match &self.database {
            Some(db) => format!("{}.{}", quote(db), quote(&self.name)),
            None => quote(&self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_schema_from_json() {
        let json = r#"{
            "tables": [{
                "name": "users",
                "columns": [
                    { "name": "id", "type": "int", "primary_key": true },
                    { "name": "email", "type": "varchar", "nullable": false },
                    { "name": "avatar", "type": "mediumblob" }
                ]
            }]
        }"#;

        let schema = Schema::from_json(json).unwrap();
        let users = schema.table("users").unwrap();
        assert_eq!(users.columns.len(), 3);

        let header = users.header();
        assert_eq!(header.primary_key(), vec!["id"]);
        assert_eq!(header.blob_names(), vec!["avatar"]);
    }

    #[test]
    fn test_type_mapping() {
        let table = TableDef::new("t")
            .pk("id", "bigint")
            .column("price", "decimal")
            .column("label", "varchar")
            .column("stamp", "timestamp")
            .column("payload", "varbinary")
            .column("geo", "geometry");
        let types: Vec<SqlType> = table.columns.iter().map(|c| c.sql_type()).collect();
        assert_eq!(
            types,
            vec![
                SqlType::Numeric,
                SqlType::Numeric,
                SqlType::Text,
                SqlType::Text,
                SqlType::Blob,
                SqlType::Other,
            ]
        );
    }

    #[test]
    fn test_schema_lookup() {
        let mut schema = Schema::new();
        schema.add_table(TableDef::new("users").pk("id", "int"));
        assert!(schema.table("users").is_some());
        assert!(schema.table("orders").is_none());
    }

    #[test]
    fn test_qualified_name() {
        let table = TableDef::new("orders").in_database("shop");
        assert_eq!(table.qualified_name(), "`shop`.`orders`");
        assert_eq!(TableDef::new("orders").qualified_name(), "`orders`");
    }

    #[test]
    fn test_table_builder() {
        let table = TableDef::new("orders")
            .pk("id", "int")
            .column("total", "decimal")
            .blob("receipt");

        assert_eq!(table.columns.len(), 3);
        assert!(table.columns[0].primary_key);
        assert!(!table.columns[0].nullable);
        assert_eq!(table.columns[2].sql_type(), SqlType::Blob);
    }
}
