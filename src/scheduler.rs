//! Cron-driven job table.
//!
//! Jobs are checked on a fixed tick; a job is due when one of its scheduled
//! instants falls after the previous check and at or before now.

use crate::configuration::ScheduleSettings;
use crate::errors::AppError;
use chrono::{DateTime, Local};
use cron::Schedule;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    ImportWords,
    SendWord,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub kind: JobKind,
    pub cron_expr: String,
    schedule: Schedule,
    last_checked: DateTime<Local>,
}

impl Job {
    pub fn new(kind: JobKind, cron_expr: &str, now: DateTime<Local>) -> Result<Self, AppError> {
        Ok(Self {
            kind,
            cron_expr: cron_expr.to_string(),
            schedule: parse_schedule(cron_expr)?,
            last_checked: now,
        })
    }

    /// Next instant this job will fire after `after`.
    pub fn next_after(&self, after: &DateTime<Local>) -> Option<DateTime<Local>> {
        self.schedule.after(after).next()
    }
}

/// The cron crate wants six fields (sec min hour dom month dow); a five-field
/// expression gets a leading `0` seconds field.
pub fn parse_schedule(cron_expr: &str) -> Result<Schedule, AppError> {
    let trimmed = cron_expr.trim();
    let full_cron = if trimmed.split_whitespace().count() == 5 {
        format!("0 {trimmed}")
    } else {
        trimmed.to_string()
    };

    Schedule::from_str(&full_cron).map_err(|e| AppError::ScheduleError {
        expr: cron_expr.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    jobs: Vec<Job>,
}

impl Scheduler {
    pub fn from_settings(
        settings: &ScheduleSettings,
        now: DateTime<Local>,
    ) -> Result<Self, AppError> {
        let mut jobs = vec![Job::new(JobKind::ImportWords, &settings.import, now)?];
        for expr in &settings.deliveries {
            jobs.push(Job::new(JobKind::SendWord, expr, now)?);
        }
        Ok(Self { jobs })
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Jobs due at `now`, in table order. Each job fires at most once per call
    /// even if several of its instants were missed.
    pub fn due_jobs(&mut self, now: DateTime<Local>) -> Vec<JobKind> {
        let mut due = Vec::new();
        for job in &mut self.jobs {
            if let Some(next) = job.next_after(&job.last_checked) {
                if next <= now {
                    due.push(job.kind);
                }
            }
            job.last_checked = now;
        }
        due
    }
}
