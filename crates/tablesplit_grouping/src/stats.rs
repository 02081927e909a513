//! Grouping and per-group finance statistics

use crate::key::GroupingKey;
use crate::model::{ExpenseRecord, GroupingModel};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GroupingError {
    #[error("Expense {expense_id} has a quantity that is not a finite number: {quantity}")]
    InvalidQuantity { expense_id: i64, quantity: f64 },

    #[error("Total amount overflowed for group {key}")]
    AmountOverflow { key: GroupingKey },
}

pub type GroupingResult<T> = std::result::Result<T, GroupingError>;

/// Group records by key. Records keep their input order inside a group.
pub fn group_expenses<'a>(
    model: &GroupingModel,
    records: impl IntoIterator<Item = &'a ExpenseRecord>,
) -> BTreeMap<GroupingKey, Vec<&'a ExpenseRecord>> {
    let mut groups: BTreeMap<GroupingKey, Vec<&'a ExpenseRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(GroupingKey::for_record(model, record))
            .or_default()
            .push(record);
    }
    debug!(groups = groups.len(), "Grouped expenses");
    groups
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceStatistic {
    pub grouping_key: GroupingKey,
    pub expense_ids: Vec<i64>,
    pub total_amount: Decimal,
    /// `None` when no expense in the group has a cost line
    pub total_quantity: Option<f64>,
}

/// One statistic per group, in key order.
pub fn finance_statistics(
    model: &GroupingModel,
    records: &[ExpenseRecord],
) -> GroupingResult<Vec<FinanceStatistic>> {
    group_expenses(model, records)
        .into_iter()
        .map(|(key, group)| summarize(key, &group))
        .collect()
}

fn summarize(key: GroupingKey, group: &[&ExpenseRecord]) -> GroupingResult<FinanceStatistic> {
    let mut total_amount = Decimal::ZERO;
    let mut total_quantity: Option<f64> = None;

    for record in group {
        for cost in &record.costs {
            let quantity = Decimal::try_from(cost.quantity).map_err(|_| {
                GroupingError::InvalidQuantity {
                    expense_id: record.id,
                    quantity: cost.quantity,
                }
            })?;
            total_amount = cost
                .price
                .checked_mul(quantity)
                .and_then(|amount| total_amount.checked_add(amount))
                .ok_or_else(|| GroupingError::AmountOverflow { key: key.clone() })?;
            *total_quantity.get_or_insert(0.0) += cost.quantity;
        }
    }

    Ok(FinanceStatistic {
        expense_ids: group.iter().map(|r| r.id).collect(),
        grouping_key: key,
        total_amount,
        total_quantity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DateScale, EntityGroup};
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_group_by_company_and_month() {
        let records = vec![
            ExpenseRecord::new(1, 1, 10, at(2024, 1, 5)),
            ExpenseRecord::new(2, 1, 10, at(2024, 1, 20)),
            ExpenseRecord::new(3, 1, 20, at(2024, 1, 20)),
            ExpenseRecord::new(4, 2, 10, at(2024, 2, 1)),
        ];
        let model = GroupingModel::new(DateScale::Month, EntityGroup::Company);

        let groups = group_expenses(&model, &records);
        let sizes: Vec<usize> = groups.values().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 1, 1]);

        let first = groups.keys().next().unwrap();
        assert_eq!(first.grouping_id, "10");
        assert_eq!(first.date_from, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_project_collapses_entities() {
        let records = vec![
            ExpenseRecord::new(1, 1, 10, at(2024, 1, 5)),
            ExpenseRecord::new(2, 1, 20, at(2024, 6, 5)),
        ];
        let model = GroupingModel::new(DateScale::Year, EntityGroup::Project);
        assert_eq!(group_expenses(&model, &records).len(), 1);
    }

    #[test]
    fn test_statistics_totals() {
        let records = vec![
            ExpenseRecord::new(1, 1, 10, at(2024, 1, 5))
                .with_cost(Decimal::new(1050, 2), 2.0)
                .with_cost(Decimal::new(300, 2), 0.5),
            ExpenseRecord::new(2, 1, 10, at(2024, 1, 6)).with_cost(Decimal::new(100, 0), 1.0),
            ExpenseRecord::new(3, 1, 20, at(2024, 1, 6)),
        ];
        let model = GroupingModel::new(DateScale::Month, EntityGroup::Company);

        let stats = finance_statistics(&model, &records).unwrap();
        assert_eq!(stats.len(), 2);

        assert_eq!(stats[0].expense_ids, vec![1, 2]);
        assert_eq!(stats[0].total_amount, Decimal::new(12250, 2));
        assert_eq!(stats[0].total_quantity, Some(3.5));

        assert_eq!(stats[1].expense_ids, vec![3]);
        assert_eq!(stats[1].total_amount, Decimal::ZERO);
        assert_eq!(stats[1].total_quantity, None);
    }

    #[test]
    fn test_invalid_quantity() {
        let records =
            vec![ExpenseRecord::new(9, 1, 10, at(2024, 1, 5)).with_cost(Decimal::ONE, f64::NAN)];
        let model = GroupingModel::default();

        let err = finance_statistics(&model, &records).unwrap_err();
        assert!(matches!(err, GroupingError::InvalidQuantity { expense_id: 9, .. }));
    }
}
