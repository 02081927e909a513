//! Storage naming conventions
//!
//! Applied after replication to every name that was not set explicitly.
//! Explicit names always win.

use crate::model::PartitionDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingConvention {
    /// Leave default names as they are
    #[default]
    Preserve,
    /// UPPER_SNAKE_CASE every default name
    UpperSnake,
}

impl NamingConvention {
    pub fn as_str(&self) -> &'static str {
        match self {
            NamingConvention::Preserve => "preserve",
            NamingConvention::UpperSnake => "upper_snake",
        }
    }

    pub fn apply(&self, name: &str) -> String {
        match self {
            NamingConvention::Preserve => name.to_string(),
            NamingConvention::UpperSnake => to_upper_snake_case(name),
        }
    }
}

impl fmt::Display for NamingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NamingConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" => Ok(NamingConvention::Preserve),
            "upper_snake" | "upper-snake" => Ok(NamingConvention::UpperSnake),
            other => Err(format!("Unknown naming convention: '{}'", other)),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LetterState {
    Initial,
    Uppercase,
    Lowercase,
    Separator,
}

/// Convert to UPPER_SNAKE_CASE.
///
/// A word break is inserted before an uppercase letter that follows a
/// lowercase letter or digit. Every space, dash or underscore becomes one
/// `_`. Anything else that is not a letter or ASCII digit is dropped.
///
/// - "StartDate" -> "START_DATE"
/// - "IX_Task_Name" -> "IX_TASK_NAME"
/// - "a__b c-d" -> "A__B_C_D"
pub fn to_upper_snake_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut state = LetterState::Initial;
    for ch in input.chars() {
        if ch.is_uppercase() {
            if state == LetterState::Lowercase {
                out.push('_');
            }
            out.push(ch);
            state = LetterState::Uppercase;
        } else if ch.is_lowercase() {
            out.extend(ch.to_uppercase());
            state = LetterState::Lowercase;
        } else if ch.is_ascii_digit() {
            out.push(ch);
            state = LetterState::Lowercase;
        } else if is_separator(ch) {
            out.push('_');
            state = LetterState::Separator;
        }
    }
    out
}

fn is_separator(ch: char) -> bool {
    (ch.is_whitespace() && !ch.is_control()) || ch == '_' || ch == '-'
}

/// Fill every unset storage name on `partition` with the convention's form
/// of its default.
pub(crate) fn apply_convention(convention: NamingConvention, partition: &mut PartitionDescriptor) {
    if convention == NamingConvention::Preserve {
        return;
    }

    let default_table = partition.table_name().to_string();

    for field in &mut partition.fields {
        if field.attributes.storage_name.is_none() {
            field.attributes.storage_name = Some(convention.apply(&field.name));
        }
    }

    for index in &mut partition.indexes {
        if index.name.is_none() {
            let default = format!("IX_{}_{}", default_table, index.fields.join("_"));
            index.name = Some(convention.apply(&default));
        }
    }

    for fk in &mut partition.foreign_keys {
        if fk.constraint_name.is_none() {
            let default = format!("FK_{}_{}_{}", default_table, fk.principal, fk.fields.join("_"));
            fk.constraint_name = Some(convention.apply(&default));
        }
    }

    if partition.table.is_none() {
        partition.table = Some(convention.apply(&default_table));
    }
}
