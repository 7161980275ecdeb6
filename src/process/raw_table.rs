pub const START_COLUMN: &str = "start_time";
pub const STOP_COLUMN: &str = "stop_time";
pub const DIFF_COLUMN: &str = "diff_time";

/// A cell is `None` once it is missing, either in the source file or after a
/// normalization stage rejected it.
pub type Cell = Option<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Column names in source order.
    pub headers: Vec<String>,
    /// Each data row, one cell per header.
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
