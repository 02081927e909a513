//! Expense grouping
//!
//! Groups expense records by entity, date scale and optionally expense
//! type, then reports per-group totals. Grouping dimensions form a closed
//! set; each maps a record to its key part through a pure function.

pub mod key;
pub mod model;
pub mod stats;

pub use key::{key_part, GroupingKey, KeyPart, PROJECT_GROUPING_ID};
pub use model::{
    DateScale, EntityGroup, ExpenseCost, ExpenseRecord, GroupingDimension, GroupingModel,
};
pub use stats::{
    finance_statistics, group_expenses, FinanceStatistic, GroupingError, GroupingResult,
};
