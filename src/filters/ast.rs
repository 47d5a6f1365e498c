/// Fields a filter can test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    /// Sender name (case-insensitive substring)
    Sender,
    /// Messages on or after a date (YYYY-MM-DD)
    Since,
    /// Messages on or before a date (YYYY-MM-DD)
    Until,
    /// Message content kind: `media`, `text` or `ephemeral`
    Has,
}

impl FilterField {
    pub fn name(self) -> &'static str {
        match self {
            Self::Sender => "sender",
            Self::Since => "since",
            Self::Until => "until",
            Self::Has => "has",
        }
    }
}

/// Logical operators for combining filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Both conditions must match (default between different fields)
    And,
    /// Either condition matches (default within same field)
    Or,
}

/// Single field:value filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: FilterField,
    pub value: String,
}

impl FieldFilter {
    pub fn new(field: FilterField, value: &str) -> Self {
        Self { field, value: value.to_string() }
    }
}

/// Field filters joined left to right by operators
///
/// There is no grouping; `operators.len()` is always `filters.len() - 1` for a
/// non-empty expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterExpr {
    pub filters: Vec<FieldFilter>,
    pub operators: Vec<FilterOperator>,
}

impl FilterExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter, joined to the previous one by `operator`
    ///
    /// The operator is ignored for the first filter.
    pub fn push(&mut self, operator: FilterOperator, filter: FieldFilter) {
        if !self.filters.is_empty() {
            self.operators.push(operator);
        }
        self.filters.push(filter);
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
