//! Query descriptions
//!
//! A backend-neutral description of a table read: equality and
//! lower-bound filters plus an optional ordering.

use std::fmt;

/// Filter comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Column equals value
    Eq,
    /// Column is greater than or equal to value
    Gte,
}

impl FilterOp {
    /// Operator name in the REST filter syntax (`col=eq.value`)
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Gte => "gte",
        }
    }
}

/// A single column filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Result ordering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// A read against one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub table: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Query {
    /// Select every row of `table`
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            order: None,
        }
    }

    /// Keep rows where `column` equals `value`
    pub fn eq(self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    /// Keep rows where `column` is at least `value`
    pub fn gte(self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filter(column, FilterOp::Gte, value)
    }

    fn filter(mut self, column: impl Into<String>, op: FilterOp, value: impl ToString) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            op,
            value: value.to_string(),
        });
        self
    }

    /// Sort by `column`
    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(Order {
            column: column.into(),
            direction,
        });
        self
    }

    /// Filter parameters only (`col=op.value`)
    pub fn filter_params(&self) -> Vec<(String, String)> {
        self.filters
            .iter()
            .map(|f| (f.column.clone(), format!("{}.{}", f.op.as_str(), f.value)))
            .collect()
    }

    /// Full REST query string parameters for a read
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(self.filter_params());
        if let Some(order) = &self.order {
            let dir = match order.direction {
                Direction::Ascending => "asc",
                Direction::Descending => "desc",
            };
            params.push(("order".to_string(), format!("{}.{}", order.column, dir)));
        }
        params
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table)?;
        for (i, filter) in self.filters.iter().enumerate() {
            let sep = if i == 0 { " where " } else { " and " };
            let op = match filter.op {
                FilterOp::Eq => "=",
                FilterOp::Gte => ">=",
            };
            write!(f, "{sep}{} {op} {:?}", filter.column, filter.value)?;
        }
        Ok(())
    }
}
