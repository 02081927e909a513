//! Expense records and grouping dimensions

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One cost line of an expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseCost {
    pub price: Decimal,
    pub quantity: f64,
}

impl ExpenseCost {
    pub fn new(price: Decimal, quantity: f64) -> Self {
        Self { price, quantity }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub expense_type_id: i64,
    pub company_id: i64,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub costs: Vec<ExpenseCost>,
}

impl ExpenseRecord {
    pub fn new(id: i64, expense_type_id: i64, company_id: i64, date: NaiveDateTime) -> Self {
        Self {
            id,
            expense_type_id,
            company_id,
            date,
            costs: Vec::new(),
        }
    }

    pub fn with_cost(mut self, price: Decimal, quantity: f64) -> Self {
        self.costs.push(ExpenseCost::new(price, quantity));
        self
    }
}

/// Date granularity of a grouping key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateScale {
    #[default]
    Day,
    Month,
    Year,
}

impl DateScale {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateScale::Day => "day",
            DateScale::Month => "month",
            DateScale::Year => "year",
        }
    }
}

impl fmt::Display for DateScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DateScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(DateScale::Day),
            "month" => Ok(DateScale::Month),
            "year" => Ok(DateScale::Year),
            other => Err(format!("Unknown date scale: '{}'", other)),
        }
    }
}

/// Entity an expense is attributed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityGroup {
    #[default]
    Company,
    Project,
    Client,
}

impl EntityGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityGroup::Company => "company",
            EntityGroup::Project => "project",
            EntityGroup::Client => "client",
        }
    }
}

impl fmt::Display for EntityGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "company" => Ok(EntityGroup::Company),
            "project" => Ok(EntityGroup::Project),
            "client" => Ok(EntityGroup::Client),
            other => Err(format!("Unknown entity group: '{}'", other)),
        }
    }
}

/// The closed set of supported grouping dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "dimension", content = "value", rename_all = "snake_case")]
pub enum GroupingDimension {
    Entity(EntityGroup),
    Date(DateScale),
    ExpenseType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingModel {
    pub date_scale: DateScale,
    pub entity_group: EntityGroup,
    #[serde(default)]
    pub group_by_expense_type: bool,
}

impl GroupingModel {
    pub fn new(date_scale: DateScale, entity_group: EntityGroup) -> Self {
        Self {
            date_scale,
            entity_group,
            group_by_expense_type: false,
        }
    }

    pub fn by_expense_type(mut self, enabled: bool) -> Self {
        self.group_by_expense_type = enabled;
        self
    }

    /// Dimensions in key order: entity, date, then expense type if enabled.
    pub fn dimensions(&self) -> Vec<GroupingDimension> {
        let mut dimensions = vec![
            GroupingDimension::Entity(self.entity_group),
            GroupingDimension::Date(self.date_scale),
        ];
        if self.group_by_expense_type {
            dimensions.push(GroupingDimension::ExpenseType);
        }
        dimensions
    }
}
