//! `tablesplit group`

use super::error::HelpfulError;
use super::output::{print_json, print_table};
use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};
use tablesplit_grouping::{
    finance_statistics, DateScale, EntityGroup, ExpenseRecord, FinanceStatistic, GroupingModel,
};
use tracing::info;

#[derive(Debug, Args)]
pub struct GroupArgs {
    /// JSON file holding an array of expense records
    pub file: PathBuf,

    /// Date granularity (day, month, year)
    #[arg(long, default_value = "month")]
    pub date_scale: DateScale,

    /// Entity to group by (company, project, client)
    #[arg(long, default_value = "company")]
    pub entity: EntityGroup,

    /// Also split groups by expense type
    #[arg(long)]
    pub by_expense_type: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: GroupArgs) -> Result<()> {
    let records = read_records(&args.file)?;
    let model = GroupingModel::new(args.date_scale, args.entity).by_expense_type(args.by_expense_type);
    let stats = finance_statistics(&model, &records)?;
    info!(
        records = records.len(),
        groups = stats.len(),
        date_scale = %model.date_scale,
        entity = %model.entity_group,
        "Computed finance statistics"
    );

    if args.json {
        return print_json(&stats);
    }
    print_statistics(&stats, model.group_by_expense_type);
    Ok(())
}

fn read_records(path: &Path) -> Result<Vec<ExpenseRecord>> {
    if !path.is_file() {
        return Err(HelpfulError::file_not_found(path).into());
    }
    let source = std::fs::read_to_string(path)
        .map_err(|err| HelpfulError::cannot_read_file(path, &err.to_string()))?;
    let records = serde_json::from_str(&source)
        .map_err(|err| HelpfulError::invalid_records(path, &err.to_string()))?;
    Ok(records)
}

fn print_statistics(stats: &[FinanceStatistic], by_expense_type: bool) {
    let mut headers = vec!["Date from", "Group"];
    if by_expense_type {
        headers.push("Expense type");
    }
    headers.extend(["Expenses", "Total amount", "Total quantity"]);

    let rows = stats
        .iter()
        .map(|stat| {
            let key = &stat.grouping_key;
            let mut row = vec![key.date_from.to_string(), key.grouping_id.clone()];
            if by_expense_type {
                row.push(key.expense_type_id.map(|id| id.to_string()).unwrap_or_default());
            }
            row.push(stat.expense_ids.len().to_string());
            row.push(stat.total_amount.to_string());
            row.push(
                stat.total_quantity
                    .map(|q| q.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            );
            row
        })
        .collect();
    print_table(&headers, rows);
}
