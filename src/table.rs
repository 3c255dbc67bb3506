use std::cmp::Ordering;
use std::fmt;

use derive_new::new;

/// A single cell in a [`Table`] column.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Canonical label used for treatment-value matching and display.
    ///
    /// Whole numbers render without a trailing `.0` so a numeric `1` matches
    /// the literal token "1".
    pub fn label(&self) -> String {
        match self {
            Value::Number(x) if x.is_finite() && x.fract() == 0.0 => format!("{}", *x as i64),
            Value::Number(x) => x.to_string(),
            Value::Text(s) => s.clone(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(x) => Some(*x),
            Value::Text(_) => None,
        }
    }

    /// Total order for unique-value sorting: numbers by magnitude, text
    /// lexically, numbers before text.
    pub(crate) fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Number(_), Value::Text(_)) => Ordering::Less,
            (Value::Text(_), Value::Number(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

impl From<i64> for Value {
    fn from(x: i64) -> Self {
        Value::Number(x as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// A named column of values.
#[derive(Debug, Clone, new)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_numeric(&self) -> bool {
        self.values.iter().all(|v| matches!(v, Value::Number(_)))
    }

    /// Distinct values in sort order (numbers before text).
    pub fn sorted_unique(&self) -> Vec<Value> {
        let mut uniques: Vec<Value> = Vec::new();
        for value in &self.values {
            if !uniques.contains(value) {
                uniques.push(value.clone());
            }
        }
        uniques.sort_by(|a, b| a.sort_cmp(b));
        uniques
    }

    /// Row indices where this column holds `value`.
    pub fn indices_of(&self, value: &Value) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| *v == value)
            .map(|(i, _)| i)
            .collect()
    }
}

/// A minimal column-oriented table: column selection, grouping by value, and
/// descriptive statistics. The summary builder consumes but does not own it,
/// and the analysis engine never touches it.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: &str, values: Vec<Value>) -> Self {
        self.columns.push(Column::new(name.to_string(), values));
        self
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }
}

/// Selects the values at `indices` from `data`.
pub fn select_indices<T: Copy>(indices: &[usize], data: &[T]) -> Vec<T> {
    indices.iter().map(|i| data[*i]).collect()
}
