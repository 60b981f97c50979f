use serde::{Deserialize, Serialize};

/// The five financial statement categories a line item can belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Income,
    Expense,
    Asset,
    Liability,
    Equity,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Income,
        Category::Expense,
        Category::Asset,
        Category::Liability,
        Category::Equity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Income => "INCOME",
            Category::Expense => "EXPENSE",
            Category::Asset => "ASSET",
            Category::Liability => "LIABILITY",
            Category::Equity => "EQUITY",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Pro,
    Expert,
}
