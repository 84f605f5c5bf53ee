use serde::{Deserialize, Serialize};

use super::{
    repo_types::{ExpensePatch, NewExpense},
    services::{checked_amount, parse_amount},
};
use crate::error::AppError;

/// Amount as sent by clients: a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    fn parse(self) -> Result<f64, AppError> {
        let value = match self {
            AmountInput::Number(n) => checked_amount(n),
            AmountInput::Text(s) => parse_amount(&s),
        };
        value.ok_or_else(|| AppError::invalid_input("amount must be a number between -1e12 and 1e12"))
    }
}

/// Body of `POST /expenses`. Owner fields in the body are ignored.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub amount: Option<AmountInput>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

/// Body of `PUT /expenses/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateExpenseRequest {
    pub amount: Option<AmountInput>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn non_blank(category: String) -> Result<String, AppError> {
    if category.trim().is_empty() {
        Err(AppError::invalid_input("category must not be empty"))
    } else {
        Ok(category)
    }
}

impl TryFrom<CreateExpenseRequest> for NewExpense {
    type Error = AppError;

    fn try_from(req: CreateExpenseRequest) -> Result<Self, Self::Error> {
        let amount = req
            .amount
            .ok_or_else(|| AppError::invalid_input("amount is required"))?
            .parse()?;
        let category = req
            .category
            .ok_or_else(|| AppError::invalid_input("category is required"))
            .and_then(non_blank)?;
        Ok(Self {
            amount,
            category,
            description: req.description,
            date: req.date,
        })
    }
}

impl TryFrom<UpdateExpenseRequest> for ExpensePatch {
    type Error = AppError;

    fn try_from(req: UpdateExpenseRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            amount: req.amount.map(AmountInput::parse).transpose()?,
            category: req.category.map(non_blank).transpose()?,
            description: req.description,
            date: req.date,
        })
    }
}
