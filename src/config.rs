use crate::calendar::{WorkCalendar, WorkCalendarConfig};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid {parameter}: {reason}")]
    Invalid {
        parameter: &'static str,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            parameter,
            reason: reason.into(),
        }
    }

    pub fn parameter(&self) -> &'static str {
        match self {
            ConfigError::Invalid { parameter, .. } => parameter,
        }
    }
}

/// Inputs of one estimation run. Every field has a default, so a partial
/// JSON document deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationConfig {
    /// Engineers on the team. Fractions round up to whole engineers.
    pub team_size: f64,
    pub points_per_sprint_per_dev: f64,
    pub sprint_weeks: u32,
    pub coordination_factor: f64,
    /// Standard deviation of the per-item duration multiplier.
    pub variance: f64,
    pub trials: usize,
    /// Base seed; trial `i` uses `seed + i`. Drawn from entropy when absent.
    pub seed: Option<u64>,
    pub min_duration_multiplier: f64,
    pub max_workdays: u32,
    /// Projection start. Today when absent.
    pub start_date: Option<NaiveDate>,
    /// Groups to break out. Every group present in the input when absent.
    pub groups: Option<Vec<String>>,
    pub calendar: WorkCalendarConfig,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            team_size: 3.25,
            points_per_sprint_per_dev: 8.0,
            sprint_weeks: 2,
            coordination_factor: 0.15,
            variance: 0.25,
            trials: 5000,
            seed: None,
            min_duration_multiplier: 0.1,
            max_workdays: 3650,
            start_date: None,
            groups: None,
            calendar: WorkCalendarConfig::default(),
        }
    }
}

fn check_positive(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::invalid(
            parameter,
            format!("must be a finite number greater than 0, got {value}"),
        ));
    }
    Ok(())
}

fn check_non_negative(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::invalid(
            parameter,
            format!("must be a finite number of at least 0, got {value}"),
        ));
    }
    Ok(())
}

impl EstimationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("team_size", self.team_size)?;
        check_positive("points_per_sprint_per_dev", self.points_per_sprint_per_dev)?;
        if self.sprint_weeks == 0 {
            return Err(ConfigError::invalid("sprint_weeks", "must be at least 1"));
        }
        check_non_negative("coordination_factor", self.coordination_factor)?;
        check_non_negative("variance", self.variance)?;
        if self.trials == 0 {
            return Err(ConfigError::invalid("trials", "must be at least 1"));
        }
        check_positive("min_duration_multiplier", self.min_duration_multiplier)?;
        if self.max_workdays == 0 {
            return Err(ConfigError::invalid("max_workdays", "must be at least 1"));
        }
        if let Some(groups) = &self.groups {
            let mut seen = HashSet::new();
            if let Some(name) = groups.iter().find(|name| !seen.insert(name.as_str())) {
                return Err(ConfigError::invalid(
                    "groups",
                    format!("group {name} is listed more than once"),
                ));
            }
        }
        self.calendar.validate()
    }

    /// Nominal points one engineer completes per workday.
    pub fn daily_capacity(&self) -> f64 {
        self.points_per_sprint_per_dev / (f64::from(self.sprint_weeks) * 5.0)
    }

    /// Whole engineers simulated for `team_size`.
    pub fn headcount(&self) -> usize {
        self.team_size.ceil().max(1.0) as usize
    }

    pub fn work_calendar(&self) -> Result<WorkCalendar, ConfigError> {
        WorkCalendar::from_config(&self.calendar)
    }

    pub fn with_team_size(mut self, team_size: f64) -> Self {
        self.team_size = team_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_variance(mut self, variance: f64) -> Self {
        self.variance = variance;
        self
    }

    pub fn with_coordination_factor(mut self, factor: f64) -> Self {
        self.coordination_factor = factor;
        self
    }

    pub fn with_start_date(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }
}
