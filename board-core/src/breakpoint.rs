//! Responsive breakpoints: viewport width to grid column count.

use serde::{Deserialize, Serialize};

use crate::{BoardError, BoardResult};

/// One viewport-width threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    /// Short name (`lg`, `md`, ...).
    pub name: String,
    /// Minimum viewport width in pixels at which this breakpoint applies.
    pub min_width: u32,
    /// Number of grid columns available.
    pub columns: u32,
}

impl Breakpoint {
    /// Create a breakpoint.
    #[must_use]
    pub fn new(name: impl Into<String>, min_width: u32, columns: u32) -> Self {
        Self {
            name: name.into(),
            min_width,
            columns,
        }
    }
}

/// Ordered breakpoint table, widest threshold first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakpointTable {
    breakpoints: Vec<Breakpoint>,
}

impl BreakpointTable {
    /// Build a table from arbitrary breakpoints.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidBreakpoints`] if the table is empty, has a
    /// zero column count, or has no breakpoint for zero-width viewports.
    pub fn new(mut breakpoints: Vec<Breakpoint>) -> BoardResult<Self> {
        if breakpoints.is_empty() {
            return Err(BoardError::InvalidBreakpoints("table is empty".into()));
        }
        if let Some(bp) = breakpoints.iter().find(|bp| bp.columns == 0) {
            return Err(BoardError::InvalidBreakpoints(format!(
                "breakpoint {} has zero columns",
                bp.name
            )));
        }
        if !breakpoints.iter().any(|bp| bp.min_width == 0) {
            return Err(BoardError::InvalidBreakpoints(
                "no breakpoint covers zero-width viewports".into(),
            ));
        }
        breakpoints.sort_by(|a, b| b.min_width.cmp(&a.min_width));
        Ok(Self { breakpoints })
    }

    /// Resolve the breakpoint active at the given viewport width.
    #[must_use]
    pub fn resolve(&self, viewport_width: u32) -> &Breakpoint {
        self.breakpoints
            .iter()
            .find(|bp| bp.min_width <= viewport_width)
            .unwrap_or_else(|| self.narrowest())
    }

    /// Column count of the widest breakpoint.
    #[must_use]
    pub fn max_columns(&self) -> u32 {
        self.breakpoints
            .iter()
            .map(|bp| bp.columns)
            .max()
            .unwrap_or(1)
    }

    /// All breakpoints, widest first.
    #[must_use]
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    fn narrowest(&self) -> &Breakpoint {
        // `new` guarantees a zero-width entry, which sorts last.
        &self.breakpoints[self.breakpoints.len() - 1]
    }
}

impl Default for BreakpointTable {
    fn default() -> Self {
        Self {
            breakpoints: vec![
                Breakpoint::new("lg", 1200, 12),
                Breakpoint::new("md", 996, 10),
                Breakpoint::new("sm", 768, 6),
                Breakpoint::new("xs", 480, 4),
                Breakpoint::new("xxs", 0, 2),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_resolution() {
        let table = BreakpointTable::default();
        assert_eq!(table.resolve(1920).columns, 12);
        assert_eq!(table.resolve(1200).columns, 12);
        assert_eq!(table.resolve(1199).columns, 10);
        assert_eq!(table.resolve(800).columns, 6);
        assert_eq!(table.resolve(480).name, "xs");
        assert_eq!(table.resolve(0).columns, 2);
        assert_eq!(table.max_columns(), 12);
    }

    #[test]
    fn test_custom_table_is_sorted() {
        let table = BreakpointTable::new(vec![
            Breakpoint::new("small", 0, 3),
            Breakpoint::new("big", 1000, 9),
        ])
        .expect("valid table");
        assert_eq!(table.breakpoints()[0].name, "big");
        assert_eq!(table.resolve(999).columns, 3);
    }

    #[test]
    fn test_invalid_tables() {
        assert!(BreakpointTable::new(Vec::new()).is_err());
        assert!(BreakpointTable::new(vec![Breakpoint::new("a", 0, 0)]).is_err());
        assert!(BreakpointTable::new(vec![Breakpoint::new("a", 100, 4)]).is_err());
    }
}
