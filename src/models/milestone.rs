//! Stream milestones

use crate::utils::errors::StreamError;

#[derive(Debug, Clone, PartialEq)]
pub struct Milestone {
    pub id: String,
    pub percentage: u8,
    pub description: String,
}

impl Milestone {
    /// Whether a stream at `streamed / total` has reached this checkpoint
    pub fn is_reachable(&self, streamed: f64, total: f64) -> bool {
        if total <= 0.0 {
            return false;
        }
        streamed / total * 100.0 >= self.percentage as f64
    }

    pub fn release_amount(&self, total: f64) -> f64 {
        self.percentage as f64 / 100.0 * total
    }
}

/// Append/remove-only list; entries keep their insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MilestoneList {
    items: Vec<Milestone>,
    next_id: u32,
}

impl MilestoneList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<Milestone>) -> Self {
        let next_id = items.len() as u32;
        MilestoneList { items, next_id }
    }

    pub fn add(&mut self, percentage: u8, description: &str) -> Result<&Milestone, StreamError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(StreamError::EmptyDescription);
        }
        if !(1..=99).contains(&percentage) {
            return Err(StreamError::PercentageOutOfRange);
        }

        self.next_id += 1;
        self.items.push(Milestone {
            id: format!("milestone-{}", self.next_id),
            percentage,
            description: description.to_string(),
        });
        Ok(&self.items[self.items.len() - 1])
    }

    pub fn remove(&mut self, id: &str) -> Result<Milestone, StreamError> {
        let idx = self
            .items
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| StreamError::MilestoneNotFound(id.to_string()))?;
        Ok(self.items.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&Milestone> {
        self.items.iter().find(|m| m.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Milestone> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Point in the stream's duration where a milestone falls: "45m", "2h", "1h 30m"
pub fn time_for_percentage(percentage: u8, duration_minutes: f64) -> String {
    let minutes = (percentage as f64 / 100.0 * duration_minutes).round() as u64;
    if minutes < 60 {
        return format!("{}m", minutes);
    }
    let hours = minutes / 60;
    let remaining = minutes % 60;
    if remaining > 0 {
        format!("{}h {}m", hours, remaining)
    } else {
        format!("{}h", hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_rejects_bad_entries() {
        let mut list = MilestoneList::new();
        assert_eq!(list.add(0, "start").unwrap_err(), StreamError::PercentageOutOfRange);
        assert_eq!(list.add(100, "end").unwrap_err(), StreamError::PercentageOutOfRange);
        assert_eq!(list.add(50, "   ").unwrap_err(), StreamError::EmptyDescription);
        assert!(list.is_empty());
    }

    #[test]
    fn test_add_and_remove_keep_order() {
        let mut list = MilestoneList::new();
        list.add(75, "three quarters").unwrap();
        list.add(25, " first quarter ").unwrap();
        list.add(75, "duplicate percentage is fine").unwrap();

        let ids: Vec<_> = list.iter().map(|m| m.id.clone()).collect();
        assert_eq!(ids, vec!["milestone-1", "milestone-2", "milestone-3"]);
        assert_eq!(list.get("milestone-2").unwrap().description, "first quarter");

        list.remove("milestone-1").unwrap();
        let pcts: Vec<_> = list.iter().map(|m| m.percentage).collect();
        assert_eq!(pcts, vec![25, 75]);
        assert!(list.remove("milestone-1").is_err());
    }

    #[test]
    fn test_reachability_boundary() {
        let m = Milestone { id: "ms".into(), percentage: 43, description: "x".into() };
        assert!(m.is_reachable(43.0, 100.0));
        assert!(!m.is_reachable(42.99, 100.0));
        assert!(!m.is_reachable(10.0, 0.0));
    }

    #[test]
    fn test_reachability_matches_rule_for_all_percentages() {
        for pct in 1..=99u8 {
            let m = Milestone { id: "ms".into(), percentage: pct, description: "x".into() };
            for streamed in 0..=200u32 {
                let streamed = streamed as f64;
                let expected = streamed / 200.0 * 100.0 >= pct as f64;
                assert_eq!(m.is_reachable(streamed, 200.0), expected);
            }
        }
    }

    #[test]
    fn test_time_for_percentage() {
        assert_eq!(time_for_percentage(25, 60.0), "15m");
        assert_eq!(time_for_percentage(50, 120.0), "1h");
        assert_eq!(time_for_percentage(75, 120.0), "1h 30m");
    }
}
