//! Plausibility and consistency checks for normalized statement fields.

use std::fmt;

use chrono::{Days, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::record::StatementFields;

/// How far from "today" a due date may lie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationWindow {
    /// Calendar months after today; the boundary date itself is accepted.
    pub max_future_months: u32,
    /// Days before today; the boundary date itself is accepted.
    pub max_past_days: u64,
}

impl Default for ValidationWindow {
    fn default() -> Self {
        Self {
            max_future_months: 24,
            max_past_days: 550,
        }
    }
}

/// Outcome of validating one set of fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Why a record was rejected. Only ever logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Rejection {
    MissingCard,
    MissingDueDate,
    TooFarAhead { due: NaiveDate, limit: NaiveDate },
    TooOld { due: NaiveDate, limit: NaiveDate },
    DueBeforeStatement { due: NaiveDate, statement: NaiveDate },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingCard => write!(f, "card number missing"),
            Rejection::MissingDueDate => write!(f, "due date missing"),
            Rejection::TooFarAhead { due, limit } => {
                write!(f, "due date {} is after {}", due, limit)
            }
            Rejection::TooOld { due, limit } => write!(f, "due date {} is before {}", due, limit),
            Rejection::DueBeforeStatement { due, statement } => {
                write!(f, "due date {} precedes statement date {}", due, statement)
            }
        }
    }
}

/// Accept/reject decision over normalized fields.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    window: ValidationWindow,
    /// Fixed reference date; `None` reads the local calendar on every call.
    today: Option<NaiveDate>,
}

impl Validator {
    /// Validator using the local date at validation time.
    pub fn new(window: ValidationWindow) -> Self {
        Self { window, today: None }
    }

    /// Validator with a fixed reference date.
    pub fn pinned(today: NaiveDate) -> Self {
        Self {
            window: ValidationWindow::default(),
            today: Some(today),
        }
    }

    pub fn with_window(mut self, window: ValidationWindow) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> &ValidationWindow {
        &self.window
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Decide whether `fields` form an acceptable record.
    pub fn validate(&self, fields: &StatementFields) -> Verdict {
        match self.check(fields) {
            Ok(()) => Verdict::Accept,
            Err(reason) => {
                debug!("rejected: {}", reason);
                Verdict::Reject
            }
        }
    }

    pub(crate) fn check(&self, fields: &StatementFields) -> Result<(), Rejection> {
        if fields.card_last4.as_deref().is_none_or(|c| c.trim().is_empty()) {
            return Err(Rejection::MissingCard);
        }
        let due = fields.due_date.ok_or(Rejection::MissingDueDate)?;

        let today = self.today();
        if let Some(limit) = today.checked_add_months(Months::new(self.window.max_future_months)) {
            if due > limit {
                return Err(Rejection::TooFarAhead { due, limit });
            }
        }
        if let Some(limit) = today.checked_sub_days(Days::new(self.window.max_past_days)) {
            if due < limit {
                return Err(Rejection::TooOld { due, limit });
            }
        }

        if let Some(statement) = fields.statement_date {
            if due < statement {
                return Err(Rejection::DueBeforeStatement { due, statement });
            }
        }

        Ok(())
    }
}
