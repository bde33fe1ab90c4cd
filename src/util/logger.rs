use std::fmt::{Display, Formatter};

use super::Log;

impl<T: Display> Display for Log<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Log::None => Ok(()),
            Log::Default(label)
            | Log::Success(label)
            | Log::Result(label)
            | Log::Verbose(label) => label.fmt(f),
        }
    }
}

impl<T> Log<T> {
    /// Numeric rank of the level; higher ranks print more.
    pub fn order(&self) -> u8 {
        match self {
            Log::None => 0,
            Log::Default(_) => 1,
            Log::Success(_) => 2,
            Log::Result(_) => 3,
            Log::Verbose(_) => 4,
        }
    }

    /// Whether a diagnostic at level `at` should print under this setting.
    pub fn enabled(&self, at: Log<()>) -> bool {
        self.order() >= at.order()
    }
}
