use std::fmt::{Display, Formatter};

use super::Position;

impl Position {
    /// Create a new position from 1-based line and column numbers.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Display for Position {
    /// Renders as `line:column`, the form used in parse error messages.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
