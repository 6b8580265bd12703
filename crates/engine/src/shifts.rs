//! Shift state for the current business day.

use api_types::shift::ShiftRow;

/// Where today's shift cycle stands.
#[derive(Clone, Debug, PartialEq)]
pub enum ShiftState {
    /// No shift was opened today.
    Unopened,
    /// A shift for today has no closing timestamp yet.
    Open(ShiftRow),
    /// Today had shifts and all of them are closed. Holds the latest one.
    Closed(ShiftRow),
}

impl ShiftState {
    /// Derives the state from the shifts recorded for one business date.
    pub fn from_day(shifts: &[ShiftRow]) -> Self {
        if let Some(open) = shifts
            .iter()
            .filter(|shift| shift.is_open())
            .max_by_key(|shift| shift.shift_number)
        {
            return Self::Open(open.clone());
        }
        match shifts.iter().max_by_key(|shift| shift.shift_number) {
            Some(last) => Self::Closed(last.clone()),
            None => Self::Unopened,
        }
    }

    pub fn open_shift(&self) -> Option<&ShiftRow> {
        match self {
            Self::Open(shift) => Some(shift),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unopened => "unopened",
            Self::Open(_) => "open",
            Self::Closed(_) => "closed",
        }
    }
}

/// Next sequential shift number for a business date.
pub fn next_shift_number(shifts: &[ShiftRow]) -> i32 {
    shifts
        .iter()
        .map(|shift| shift.shift_number)
        .max()
        .map_or(1, |last| last + 1)
}

/// Answer of "does this shift already have a daily closing".
///
/// `Unknown` means the check itself failed; callers must block and ask for a
/// retry instead of reading it as `Absent`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClosingPresence {
    Absent,
    Present,
    Unknown,
}
