//! Schema to SQL DDL conversion module.

mod dialect;
mod generator;
mod types;

pub use dialect::Dialect;
pub use generator::{SqlGenerator, SqlOptions};
pub use types::{column_type, default_expr, map_scalar, referential_action};
