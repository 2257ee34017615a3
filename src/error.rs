use core::fmt;

/// Error returned by a [`KeyValueStore`](crate::storage::KeyValueStore)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The backing storage could not be opened
    Unavailable,
    /// The backing storage refused the write
    Rejected,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => f.write_str("storage unavailable"),
            Self::Rejected => f.write_str("storage rejected write"),
        }
    }
}

/// Error returned when a schedule cannot be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// Input was empty or contained no usable entries
    Empty,
    /// Input was not valid JSON
    Malformed,
    /// Input was JSON but not a list of entries
    NotAList,
    /// The schedule already holds the maximum number of entries
    CapacityExceeded,
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("schedule is empty"),
            Self::Malformed => f.write_str("schedule is not valid JSON"),
            Self::NotAList => f.write_str("schedule is not a list"),
            Self::CapacityExceeded => f.write_str("schedule capacity exceeded"),
        }
    }
}
