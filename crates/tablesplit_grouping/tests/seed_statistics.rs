//! Finance statistics over a small seeded ledger
//!
//! Two companies, two expense types, eight expenses spread over 2021-2023.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tablesplit_grouping::{
    finance_statistics, group_expenses, DateScale, EntityGroup, ExpenseRecord, GroupingModel,
};

// =============================================================================
// FIXTURES
// =============================================================================

fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn dec(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

fn seed() -> Vec<ExpenseRecord> {
    vec![
        ExpenseRecord::new(1, 1, 1, day(2021, 1, 1))
            .with_cost(dec(10), 1.0)
            .with_cost(dec(90), 9.0),
        ExpenseRecord::new(2, 1, 1, day(2021, 1, 1))
            .with_cost(dec(20), 2.0)
            .with_cost(dec(100), 10.0),
        ExpenseRecord::new(3, 2, 1, day(2022, 10, 2))
            .with_cost(dec(30), 3.0)
            .with_cost(dec(110), 11.0),
        ExpenseRecord::new(4, 2, 1, day(2022, 10, 3))
            .with_cost(dec(40), 4.0)
            .with_cost(dec(120), 12.0),
        ExpenseRecord::new(5, 1, 2, day(2022, 11, 4))
            .with_cost(dec(50), 5.0)
            .with_cost(dec(130), 13.0),
        ExpenseRecord::new(6, 1, 2, day(2023, 2, 2)).with_cost(dec(60), 6.0),
        ExpenseRecord::new(7, 2, 2, day(2023, 3, 1)).with_cost(dec(70), 7.0),
        ExpenseRecord::new(8, 2, 2, day(2023, 3, 2)).with_cost(dec(80), 8.0),
    ]
}

fn jan1(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
}

// =============================================================================
// GROUPING
// =============================================================================

/// Company by year: one group per (year, company) pair present
#[test]
fn test_company_by_year() {
    let model = GroupingModel::new(DateScale::Year, EntityGroup::Company);
    let stats = finance_statistics(&model, &seed()).unwrap();

    let summary: Vec<(NaiveDate, &str, Vec<i64>, Decimal, Option<f64>)> = stats
        .iter()
        .map(|s| {
            (
                s.grouping_key.date_from,
                s.grouping_key.grouping_id.as_str(),
                s.expense_ids.clone(),
                s.total_amount,
                s.total_quantity,
            )
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            (jan1(2021), "1", vec![1, 2], dec(1860), Some(22.0)),
            (jan1(2022), "1", vec![3, 4], dec(2900), Some(30.0)),
            (jan1(2022), "2", vec![5], dec(1940), Some(18.0)),
            (jan1(2023), "2", vec![6, 7, 8], dec(1490), Some(21.0)),
        ]
    );
}

/// Client groups the same way as company
#[test]
fn test_client_matches_company() {
    let records = seed();
    let by_company = group_expenses(&GroupingModel::new(DateScale::Day, EntityGroup::Company), &records);
    let by_client = group_expenses(&GroupingModel::new(DateScale::Day, EntityGroup::Client), &records);

    assert_eq!(
        by_company.keys().collect::<Vec<_>>(),
        by_client.keys().collect::<Vec<_>>()
    );
}

/// Project grouping collapses every company into one id
#[test]
fn test_project_by_year() {
    let model = GroupingModel::new(DateScale::Year, EntityGroup::Project);
    let stats = finance_statistics(&model, &seed()).unwrap();

    assert_eq!(stats.len(), 3);
    assert!(stats.iter().all(|s| s.grouping_key.grouping_id == "1"));
    assert_eq!(stats[1].expense_ids, vec![3, 4, 5]);
    assert_eq!(stats[1].total_amount, dec(4840));
    assert_eq!(stats[1].total_quantity, Some(48.0));
}

/// Month plus expense type splits the 2023 company-2 expenses
#[test]
fn test_month_by_expense_type() {
    let model = GroupingModel::new(DateScale::Month, EntityGroup::Company).by_expense_type(true);
    let stats = finance_statistics(&model, &seed()).unwrap();

    assert_eq!(stats.len(), 5);
    let last = stats.last().unwrap();
    assert_eq!(last.grouping_key.date_from, NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
    assert_eq!(last.grouping_key.expense_type_id, Some(2));
    assert_eq!(last.expense_ids, vec![7, 8]);
    assert_eq!(last.total_amount, dec(1130));
}

/// Statistics serialize with the key nested and amounts as strings
#[test]
fn test_statistics_json_shape() {
    let model = GroupingModel::new(DateScale::Year, EntityGroup::Company);
    let stats = finance_statistics(&model, &seed()).unwrap();

    let value = serde_json::to_value(&stats[0]).unwrap();
    assert_eq!(value["grouping_key"]["date_from"], "2021-01-01");
    assert_eq!(value["grouping_key"]["grouping_id"], "1");
    assert!(value["grouping_key"].get("expense_type_id").is_none());
    let amount: Decimal = value["total_amount"].as_str().unwrap().parse().unwrap();
    assert_eq!(amount, dec(1860));
}

/// An empty ledger has no groups
#[test]
fn test_empty_ledger() {
    let stats = finance_statistics(&GroupingModel::default(), &[]).unwrap();
    assert!(stats.is_empty());
}
