//! Grouping keys
//!
//! Each dimension maps a record to one key part; the parts fold into a
//! [`GroupingKey`]. No dimension is resolved at runtime by name.

use crate::model::{DateScale, EntityGroup, ExpenseRecord, GroupingDimension, GroupingModel};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grouping id shared by every expense when grouping by project.
pub const PROJECT_GROUPING_ID: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPart {
    GroupingId(String),
    DateFrom(NaiveDate),
    ExpenseType(i64),
}

/// Map one record onto one dimension.
pub fn key_part(dimension: GroupingDimension, record: &ExpenseRecord) -> KeyPart {
    match dimension {
        GroupingDimension::Entity(EntityGroup::Company | EntityGroup::Client) => {
            KeyPart::GroupingId(record.company_id.to_string())
        }
        GroupingDimension::Entity(EntityGroup::Project) => {
            KeyPart::GroupingId(PROJECT_GROUPING_ID.to_string())
        }
        GroupingDimension::Date(scale) => KeyPart::DateFrom(truncate(record.date.date(), scale)),
        GroupingDimension::ExpenseType => KeyPart::ExpenseType(record.expense_type_id),
    }
}

fn truncate(date: NaiveDate, scale: DateScale) -> NaiveDate {
    let truncated = match scale {
        DateScale::Day => Some(date),
        DateScale::Month => date.with_day(1),
        DateScale::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
    };
    // Day 1 and January 1st exist in every year chrono can represent
    truncated.unwrap_or(date)
}

/// Ordered by date, then grouping id, then expense type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupingKey {
    pub date_from: NaiveDate,
    pub grouping_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense_type_id: Option<i64>,
}

impl GroupingKey {
    pub fn for_record(model: &GroupingModel, record: &ExpenseRecord) -> Self {
        let mut key = GroupingKey {
            date_from: record.date.date(),
            grouping_id: String::new(),
            expense_type_id: None,
        };
        for dimension in model.dimensions() {
            key.apply(key_part(dimension, record));
        }
        key
    }

    fn apply(&mut self, part: KeyPart) {
        match part {
            KeyPart::GroupingId(id) => self.grouping_id = id,
            KeyPart::DateFrom(date) => self.date_from = date,
            KeyPart::ExpenseType(id) => self.expense_type_id = Some(id),
        }
    }
}

impl fmt::Display for GroupingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.date_from, self.grouping_id)?;
        if let Some(expense_type) = self.expense_type_id {
            write!(f, " / type {}", expense_type)?;
        }
        Ok(())
    }
}
