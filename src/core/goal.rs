//! Savings goals and their progress state machine
//!
//! A goal is `Active` until its saved amount reaches the target, at which
//! point it becomes `Completed`. Removing progress recomputes completion from
//! the new amount, so a goal that drops below its target becomes active again.

use super::repository::Record;
use super::validation::{ensure_amount, ensure_not_blank};
use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_GOAL_CATEGORY: &str = "General";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalStatus {
    Active,
    Completed,
}

impl Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoalStatus::Active => write!(f, "Active"),
            GoalStatus::Completed => write!(f, "Completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialGoal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    pub target_date: NaiveDate,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub is_completed: bool,
}

fn default_category() -> String {
    DEFAULT_GOAL_CATEGORY.to_string()
}

impl FinancialGoal {
    pub fn new(
        title: &str,
        description: &str,
        target_amount: f64,
        current_amount: f64,
        target_date: NaiveDate,
        category: Option<&str>,
    ) -> Result<Self> {
        if target_amount <= 0.0 {
            bail!("Target amount must be greater than zero, got {target_amount}");
        }
        let goal = Self {
            id: Uuid::now_v7().to_string(),
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            target_amount,
            current_amount,
            target_date,
            category: category.map_or_else(default_category, |c| c.trim().to_string()),
            is_completed: current_amount >= target_amount,
        };
        goal.validate()?;
        Ok(goal)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_not_blank("Goal title", &self.title)?;
        ensure_amount("Target amount", self.target_amount)?;
        ensure_amount("Current amount", self.current_amount)
    }

    pub fn status(&self) -> GoalStatus {
        if self.is_completed {
            GoalStatus::Completed
        } else {
            GoalStatus::Active
        }
    }

    /// Saved share of the target as a percentage. May exceed 100 when the goal
    /// is over-funded; zero when the target is not positive.
    pub fn progress_percentage(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 0.0;
        }
        self.current_amount / self.target_amount * 100.0
    }

    /// Progress clamped to `[0, 100]` for display.
    pub fn display_progress(&self) -> f64 {
        self.progress_percentage().clamp(0.0, 100.0)
    }

    pub fn remaining_amount(&self) -> f64 {
        (self.target_amount - self.current_amount).max(0.0)
    }

    /// Returns a copy with a new target. Completion follows the new target, so
    /// lowering it below the saved amount completes the goal.
    pub fn with_target(&self, target_amount: f64) -> Result<Self> {
        if target_amount <= 0.0 {
            bail!("Target amount must be greater than zero, got {target_amount}");
        }
        let goal = Self {
            target_amount,
            is_completed: self.current_amount >= target_amount,
            ..self.clone()
        };
        goal.validate()?;
        Ok(goal)
    }

    /// Adds `amount` to the saved total, completing the goal once the target is met.
    pub fn add_progress(&self, amount: f64) -> Result<Self> {
        ensure_amount("Progress amount", amount)?;
        let current_amount = self.current_amount + amount;
        let is_completed = self.is_completed || current_amount >= self.target_amount;
        debug!(
            goal = %self.id,
            "Progress added: {} -> {current_amount} (completed: {is_completed})",
            self.current_amount
        );
        Ok(Self {
            current_amount,
            is_completed,
            ..self.clone()
        })
    }

    /// Removes `amount` from the saved total, never going below zero.
    pub fn remove_progress(&self, amount: f64) -> Result<Self> {
        ensure_amount("Progress amount", amount)?;
        let current_amount = (self.current_amount - amount).max(0.0);
        let is_completed = current_amount >= self.target_amount;
        debug!(
            goal = %self.id,
            "Progress removed: {} -> {current_amount} (completed: {is_completed})",
            self.current_amount
        );
        Ok(Self {
            current_amount,
            is_completed,
            ..self.clone()
        })
    }
}

impl Record for FinancialGoal {
    const COLLECTION: &'static str = "goals";

    fn id(&self) -> &str {
        &self.id
    }
}
