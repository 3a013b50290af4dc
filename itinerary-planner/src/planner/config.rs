//! Planning configuration for the itinerary planner.

use chrono::Duration;

use crate::domain::ClockTime;

/// Configuration parameters for itinerary planning.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Maximum committed headcount per trip instance.
    pub capacity_limit: u32,

    /// Target margin between arriving at a hall and kickoff (minutes).
    pub game_buffer_mins: i64,

    /// Smaller margins tried, in order, when the target cannot be met.
    pub relaxed_buffers_mins: Vec<i64>,

    /// Latest arrival at the lodging, before kickoff, when resetting there
    /// between games (minutes).
    pub anchor_reset_buffer_mins: i64,

    /// Minimum time to change buses at a transfer stop (minutes).
    pub transfer_slack_mins: i64,

    /// How long before kickoff to start looking for departures when the
    /// squad has no earlier commitment that day (minutes).
    pub day_start_lookback_mins: i64,

    /// Length of the communal lunch (minutes).
    pub lunch_duration_mins: i64,

    /// Extra gap beyond the lunch itself required between two games before
    /// lunch is fitted between them (minutes).
    pub lunch_gap_extra_mins: i64,

    /// Shortest meal worth keeping (minutes).
    /// Lunch attempts that leave less than this are abandoned.
    pub min_meal_mins: i64,

    /// Latest arrival at the concert, before it starts (minutes).
    pub concert_buffer_mins: i64,

    /// Earliest arrival at the concert, before it starts (minutes).
    pub concert_lookback_mins: i64,

    /// Preferred earliest departure towards the concert.
    pub concert_soft_earliest: ClockTime,

    /// Offsets from the preferred departure time tried in order (minutes).
    pub concert_offsets_mins: Vec<i64>,

    /// Minimum travel time assumed for a chartered ride (minutes).
    pub charter_min_travel_mins: i64,

    /// A charter to a game departs no earlier than this before kickoff (minutes).
    pub charter_lead_mins: i64,

    /// Travel time assumed for a charter that cannot leave early enough to
    /// meet the target buffer (minutes).
    pub charter_late_travel_mins: i64,

    /// Such a late charter never arrives earlier than this before kickoff
    /// (minutes).
    pub charter_late_buffer_mins: i64,
}

impl PlannerConfig {
    /// Returns the target game buffer as a Duration.
    pub fn game_buffer(&self) -> Duration {
        Duration::minutes(self.game_buffer_mins)
    }

    /// Returns the anchor reset buffer as a Duration.
    pub fn anchor_reset_buffer(&self) -> Duration {
        Duration::minutes(self.anchor_reset_buffer_mins)
    }

    /// Returns the transfer slack as a Duration.
    pub fn transfer_slack(&self) -> Duration {
        Duration::minutes(self.transfer_slack_mins)
    }

    /// Returns the day-start lookback as a Duration.
    pub fn day_start_lookback(&self) -> Duration {
        Duration::minutes(self.day_start_lookback_mins)
    }

    /// Returns the lunch duration as a Duration.
    pub fn lunch_duration(&self) -> Duration {
        Duration::minutes(self.lunch_duration_mins)
    }

    /// Smallest gap between two games that fits lunch.
    pub fn lunch_gap(&self) -> Duration {
        Duration::minutes(self.lunch_duration_mins + self.lunch_gap_extra_mins)
    }

    /// Returns the minimum meal length as a Duration.
    pub fn min_meal(&self) -> Duration {
        Duration::minutes(self.min_meal_mins)
    }

    /// Returns the concert arrival buffer as a Duration.
    pub fn concert_buffer(&self) -> Duration {
        Duration::minutes(self.concert_buffer_mins)
    }

    /// Returns the concert lookback as a Duration.
    pub fn concert_lookback(&self) -> Duration {
        Duration::minutes(self.concert_lookback_mins)
    }

    /// Returns the minimum charter travel time as a Duration.
    pub fn charter_min_travel(&self) -> Duration {
        Duration::minutes(self.charter_min_travel_mins)
    }

    /// Returns the charter lead as a Duration.
    pub fn charter_lead(&self) -> Duration {
        Duration::minutes(self.charter_lead_mins)
    }

    pub fn charter_late_travel(&self) -> Duration {
        Duration::minutes(self.charter_late_travel_mins)
    }

    pub fn charter_late_buffer(&self) -> Duration {
        Duration::minutes(self.charter_late_buffer_mins)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            capacity_limit: 120,
            game_buffer_mins: 40,
            relaxed_buffers_mins: vec![20, 10],
            anchor_reset_buffer_mins: 60,
            transfer_slack_mins: 5,
            day_start_lookback_mins: 180, // 3 hours
            lunch_duration_mins: 45,
            lunch_gap_extra_mins: 60,
            min_meal_mins: 15,
            concert_buffer_mins: 20,
            concert_lookback_mins: 90,
            concert_soft_earliest: ClockTime::from_minutes(17 * 60),
            concert_offsets_mins: vec![0, -15, -20, -30, -40, -45, -50, -60, 10, 20, 30, 45, 60],
            charter_min_travel_mins: 15,
            charter_lead_mins: 60,
            charter_late_travel_mins: 20,
            charter_late_buffer_mins: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlannerConfig::default();

        assert_eq!(config.capacity_limit, 120);
        assert_eq!(config.game_buffer_mins, 40);
        assert_eq!(config.relaxed_buffers_mins, vec![20, 10]);
        assert_eq!(config.anchor_reset_buffer_mins, 60);
        assert_eq!(config.transfer_slack_mins, 5);
        assert_eq!(config.day_start_lookback_mins, 180);
        assert_eq!(config.min_meal_mins, 15);
        assert_eq!(config.concert_soft_earliest.to_string(), "17:00");
        assert_eq!(config.concert_offsets_mins.len(), 13);
        assert_eq!(config.concert_offsets_mins[0], 0);
        assert_eq!(config.charter_lead_mins, 60);
        assert_eq!(config.charter_late_travel_mins, 20);
        assert_eq!(config.charter_late_buffer_mins, 30);
    }

    #[test]
    fn duration_methods() {
        let config = PlannerConfig::default();

        assert_eq!(config.game_buffer(), Duration::minutes(40));
        assert_eq!(config.anchor_reset_buffer(), Duration::minutes(60));
        assert_eq!(config.transfer_slack(), Duration::minutes(5));
        assert_eq!(config.lunch_duration(), Duration::minutes(45));
        assert_eq!(config.lunch_gap(), Duration::minutes(105));
        assert_eq!(config.concert_buffer(), Duration::minutes(20));
        assert_eq!(config.concert_lookback(), Duration::minutes(90));
        assert_eq!(config.charter_min_travel(), Duration::minutes(15));
        assert_eq!(config.charter_late_travel(), Duration::minutes(20));
        assert_eq!(config.charter_late_buffer(), Duration::minutes(30));
    }

    #[test]
    fn custom_config() {
        let config = PlannerConfig {
            capacity_limit: 50,
            relaxed_buffers_mins: vec![30],
            ..PlannerConfig::default()
        };

        assert_eq!(config.capacity_limit, 50);
        assert_eq!(config.relaxed_buffers_mins, vec![30]);
        assert_eq!(config.game_buffer_mins, 40);
    }
}
