//! SQL dialect selection and identifier quoting.

use serde::{Deserialize, Serialize};

/// Target SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Dialect {
    /// PostgreSQL, with native enum types.
    #[default]
    PostgreSQL,
    /// MySQL / MariaDB; enums become string columns.
    MySQL,
}

impl Dialect {
    /// Parse dialect from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(Self::PostgreSQL),
            "mysql" | "mariadb" => Some(Self::MySQL),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::PostgreSQL => "PostgreSQL",
            Self::MySQL => "MySQL",
        }
    }

    /// Whether `CREATE TYPE ... AS ENUM` is available.
    pub fn supports_enum_types(self) -> bool {
        matches!(self, Self::PostgreSQL)
    }

    pub fn quote_ident(self, ident: &str) -> String {
        match self {
            Self::PostgreSQL => format!("\"{}\"", ident.replace('"', "\"\"")),
            Self::MySQL => format!("`{}`", ident.replace('`', "``")),
        }
    }
}
