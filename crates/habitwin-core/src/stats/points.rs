//! Total vs. earned points for a single day.

use serde::{Deserialize, Serialize};

use super::context::DaySnapshot;
use crate::model::TemplateId;

/// Points for one day's in-scope habits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsSummary {
    pub template_id: Option<TemplateId>,
    pub total_points: u64,
    pub done_points: u64,
}

impl PointsSummary {
    /// Completed share of the day's points (0.0 to 1.0). Zero when there is
    /// nothing to earn.
    pub fn ratio(&self) -> f64 {
        if self.total_points == 0 {
            0.0
        } else {
            self.done_points as f64 / self.total_points as f64
        }
    }

    /// Whether the done share reaches `threshold_percent`. Integer
    /// comparison, so exact equality is a win. Never true for a zero total.
    pub fn meets_threshold(&self, threshold_percent: u32) -> bool {
        self.total_points > 0
            && self.done_points * 100 >= u64::from(threshold_percent) * self.total_points
    }
}

/// Sums habit points over a day's effective habit subset.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointsAggregator;

impl PointsAggregator {
    pub fn new() -> Self {
        Self
    }

    /// An empty subset yields `{0, 0}`.
    pub fn aggregate(&self, snapshot: &DaySnapshot) -> PointsSummary {
        let mut summary = PointsSummary {
            template_id: snapshot.template_id.clone(),
            ..PointsSummary::default()
        };
        for habit in snapshot.habits_in_scope() {
            let points = u64::from(habit.points);
            summary.total_points += points;
            if snapshot.checked.contains(&habit.id) {
                summary.done_points += points;
            }
        }
        summary
    }
}
