use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::Fields;

/// A typed edge between two pipeline elements, carrying the record schema
/// that crosses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    name: String,
    fields: Fields,
}

impl Scope {
    pub fn new(name: impl Into<String>, fields: Fields) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// The name of the producing element, used for tracing a record's path.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scope('{}', {})", self.name, self.fields)
    }
}
