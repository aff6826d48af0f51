//! Keyed add/remove deltas between current shifts and the persisted snapshot.

mod diff_kind;
mod shift_diff;

pub use diff_kind::DiffKind;
pub use shift_diff::ShiftDiff;
