//! # relvar — a relational-algebra query compiler
//!
//! Compose relational variables with algebra operators and compile the
//! resulting tree into a single executable SQL statement.
//!
//! ## Quick Example
//!
//! ```rust
//! use relvar::prelude::*;
//!
//! let users = TableDef::new("users")
//!     .pk("id", "int")
//!     .column("email", "varchar")
//!     .column("role", "varchar");
//!
//! let admins = Relvar::table(&users).and("role = 'admin'");
//! let sql = relvar::engine::count_sql(&admins).unwrap();
//! assert_eq!(sql, "SELECT COUNT(*) FROM `users` WHERE role = 'admin'");
//! ```
//!
//! ## Operators
//!
//! | Combinator  | Algebra            | SQL shape                        |
//! |-------------|--------------------|----------------------------------|
//! | `project`   | π / rename / extend| select list, `AS` aliases        |
//! | `join`      | natural join       | `NATURAL JOIN`                   |
//! | `aggregate` | summarize          | `NATURAL JOIN ... GROUP BY key`  |
//! | `and`       | restriction        | `WHERE ...`                      |
//! | `minus`     | antijoin           | `WHERE NOT ... / NOT IN`         |
//! | `union`     | OR of restrictions | `WHERE (a OR b)`                 |
//! | `negate`    | negation           | `WHERE NOT(...)`                 |

pub mod ast;
pub mod engine;
pub mod error;
pub mod header;
pub mod literal;
pub mod parser;
pub mod restriction;
pub mod schema;
pub mod transpiler;

pub mod prelude {
    pub use crate::ast::{Node, Relvar};
    pub use crate::engine::{count_sql, exists_sql, fetch_sql, Db, Tail};
    pub use crate::error::{RelError, RelResult};
    pub use crate::header::{Attribute, Header, SqlType};
    pub use crate::parser::{parse_spec, AttrSpec};
    pub use crate::restriction::{Restriction, Row, Value};
    pub use crate::schema::{ColumnDef, Schema, TableDef};
    pub use crate::transpiler::{Compiler, Enclose};
}
