//! Daily attendance ledger: one record per employee per local calendar day.
//!
//! Check-in creates the day's record, check-out completes it and derives
//! hours worked and the day's status. A completed day is terminal. The
//! (employee, day) unique constraint is what keeps concurrent stamps from
//! producing duplicate records; losing racers observe a conflict, never a
//! second row.

pub(crate) mod reports;
pub(crate) mod stamp;
mod storage;
pub(crate) mod types;
