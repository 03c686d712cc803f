//! Payment stream models

use std::fmt;

use super::milestone::MilestoneList;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    Active,
    Paused,
    Completed,
}

impl StreamStatus {
    pub fn icon(self) -> &'static str {
        match self {
            StreamStatus::Active => "▶️",
            StreamStatus::Paused => "⏸️",
            StreamStatus::Completed => "⏹️",
        }
    }

    pub fn color(self) -> u32 {
        match self {
            StreamStatus::Active => 0x22c55e,
            StreamStatus::Paused => 0xf59e0b,
            StreamStatus::Completed => 0x3b82f6,
        }
    }
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamStatus::Active => f.write_str("Active"),
            StreamStatus::Paused => f.write_str("Paused"),
            StreamStatus::Completed => f.write_str("Completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    pub id: String,
    pub recipient: String,
    pub total_amount: f64,
    pub streamed_amount: f64,
    pub rate_per_time: String,
    pub status: StreamStatus,
    pub milestones: MilestoneList,
    pub token: String,
}

impl Stream {
    pub fn progress_percent(&self) -> f64 {
        if self.total_amount <= 0.0 {
            return 0.0;
        }
        self.streamed_amount / self.total_amount * 100.0
    }

    /// Operator-driven; any status may follow any other
    pub fn set_status(&mut self, status: StreamStatus) {
        self.status = status;
    }

    pub fn is_completed(&self) -> bool {
        self.status == StreamStatus::Completed
    }
}

/// Outcome of a milestone release, shown as a notice only
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseResult {
    pub stream_id: String,
    pub recipient: String,
    pub token: String,
    pub amount: f64,
    pub milestone_description: String,
}
