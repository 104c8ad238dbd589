use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::CoreError;

/// One scraped business lead: a loose mapping of field name to JSON value.
///
/// Absent fields and explicit `null` are treated the same by every value
/// accessor; only [`Record::has_key`] tells them apart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Raw value for `field`, or `None` when the field is absent or null.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    /// Whether the mapping carries `field` at all, even as `null`.
    #[must_use]
    pub fn has_key(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Trimmed, non-blank text view of a scalar field.
    ///
    /// Numbers and booleans are rendered as text so that a phone stored as a
    /// JSON number still reads as digits. Arrays, objects, null and blank
    /// strings yield `None`.
    #[must_use]
    pub fn text(&self, field: &str) -> Option<String> {
        match self.get(field)? {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Whether `field` carries a usable (non-null, non-blank) value.
    #[must_use]
    pub fn is_present(&self, field: &str) -> bool {
        match self.get(field) {
            None => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }

    /// Number of non-null fields. Blank strings count, matching the
    /// completeness measure used to pick a surviving duplicate.
    #[must_use]
    pub fn non_null_count(&self) -> usize {
        self.0.values().filter(|v| !v.is_null()).count()
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn fields_mut(&mut self) -> impl Iterator<Item = (&String, &mut Value)> {
        self.0.iter_mut()
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// An ordered collection of records plus the union of their columns.
///
/// Columns are kept in first-seen order and survive record removal, so a
/// dataset filtered down to zero rows still reports its schema.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Vec<Record>")]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut dataset = Self {
            columns: Vec::new(),
            records: Vec::with_capacity(records.len()),
        };
        for record in records {
            dataset.push(record);
        }
        dataset
    }

    /// Build a dataset from a JSON array of objects.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotTabular`] when `value` is not an array and
    /// [`CoreError::InvalidRow`] when any element is not an object.
    pub fn from_json(value: Value) -> Result<Self, CoreError> {
        let Value::Array(rows) = value else {
            return Err(CoreError::NotTabular {
                found: json_kind(&value).to_string(),
            });
        };

        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            match row {
                Value::Object(map) => records.push(Record::from(map)),
                other => {
                    return Err(CoreError::InvalidRow {
                        index,
                        found: json_kind(&other).to_string(),
                    })
                }
            }
        }
        Ok(Self::from_records(records))
    }

    /// Parse a JSON document and build a dataset from it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Json`] on malformed JSON, otherwise the errors of
    /// [`Dataset::from_json`].
    pub fn from_json_str(input: &str) -> Result<Self, CoreError> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_json(value)
    }

    pub fn push(&mut self, record: Record) {
        for key in record.as_map().keys() {
            if !self.columns.iter().any(|c| c == key) {
                self.columns.push(key.clone());
            }
        }
        self.records.push(record);
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// New dataset holding the records at `indices` (in the given order),
    /// keeping this dataset's column set.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            records: indices
                .iter()
                .filter_map(|&i| self.records.get(i).cloned())
                .collect(),
        }
    }

    /// Keep only records for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&Record) -> bool) {
        self.records.retain(keep);
    }

    /// Apply `f` to every record, registering any columns it adds.
    pub fn update_records(&mut self, mut f: impl FnMut(&mut Record)) {
        for record in &mut self.records {
            f(record);
        }
        let mut seen: Vec<String> = Vec::new();
        for record in &self.records {
            for key in record.as_map().keys() {
                if !self.columns.contains(key) && !seen.contains(key) {
                    seen.push(key.clone());
                }
            }
        }
        self.columns.extend(seen);
    }

    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// JSON array of objects, one per record.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.records
                .iter()
                .map(|r| Value::Object(r.as_map().clone()))
                .collect(),
        )
    }
}

impl From<Vec<Record>> for Dataset {
    fn from(records: Vec<Record>) -> Self {
        Self::from_records(records)
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.records)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
