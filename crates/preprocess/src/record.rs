//! Application record snapshot.

use serde_json::{Map, Value};
use uuid::Uuid;

/// One loan application row, serialized to a JSON field map.
///
/// Immutable snapshot for the duration of a single prediction attempt.
#[derive(Debug, Clone)]
pub struct ApplicationRecord {
    id: Uuid,
    fields: Map<String, Value>,
}

impl ApplicationRecord {
    #[must_use]
    pub const fn new(id: Uuid, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the raw value for a field, if the column exists on the row.
    ///
    /// A stored SQL NULL surfaces as `Some(&Value::Null)`; a column the
    /// row lacks outright surfaces as `None`. The feature builder treats
    /// the two differently.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns true if the row has a column with this name.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}
