use crate::model::{Cell, Grid};

/// Anything that can produce a grid of cells with a header row.
///
/// Reading is a blocking call. A decode failure is returned as a message and
/// aborts the run; the engine never retries.
pub trait TabularSource {
    /// Short name used in diagnostics, usually the file name.
    fn label(&self) -> String;

    fn read_grid(&self) -> Result<Grid, String>;
}

/// In-memory grid. Used by tests and by callers that already hold decoded data.
#[derive(Debug, Clone, PartialEq)]
pub struct MemorySource {
    label: String,
    grid: Grid,
}

impl MemorySource {
    pub fn new(label: impl Into<String>, grid: Grid) -> Self {
        Self { label: label.into(), grid }
    }

    /// Build from string rows; blank strings become empty cells.
    pub fn from_text_rows<R, S>(label: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let grid = rows
            .into_iter()
            .map(|row| row.into_iter().map(|v| Cell::text(v.as_ref())).collect())
            .collect();
        Self::new(label, grid)
    }
}

impl TabularSource for MemorySource {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn read_grid(&self) -> Result<Grid, String> {
        Ok(self.grid.clone())
    }
}
