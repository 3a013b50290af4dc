//! Squads and their fixture-list games.

use std::collections::BTreeSet;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::{ClockTime, GameId, HallId, LodgingId, ServiceDay, SquadId};

/// Age at or above which games run the long format.
const SENIOR_AGE: u8 = 13;
const SENIOR_GAME_MINS: i64 = 25;
const JUNIOR_GAME_MINS: i64 = 20;

/// One fixture-list game a squad plays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    /// Tournament (age bracket) the game belongs to.
    pub tournament: String,
    /// Age of the bracket; unknown brackets play the long format.
    #[serde(default)]
    pub age: Option<u8>,
    pub hall: HallId,
    pub hall_name: String,
    pub day: ServiceDay,
    pub start: ClockTime,
    #[serde(default)]
    pub opponent: Option<String>,
    #[serde(default)]
    pub match_code: Option<String>,
}

impl Game {
    /// Playing time: 25 minutes for age 13 and over (or unknown), 20 otherwise.
    ///
    /// ```
    /// # use itinerary_planner::domain::*;
    /// # use chrono::Duration;
    /// let mut game = Game {
    ///     id: GameId(1),
    ///     tournament: "G14".into(),
    ///     age: Some(14),
    ///     hall: HallId(1),
    ///     hall_name: "Herneshallen".into(),
    ///     day: ServiceDay::Friday,
    ///     start: ClockTime::parse_hhmm("10:00").unwrap(),
    ///     opponent: None,
    ///     match_code: None,
    /// };
    /// assert_eq!(game.duration(), Duration::minutes(25));
    /// game.age = Some(11);
    /// assert_eq!(game.duration(), Duration::minutes(20));
    /// ```
    pub fn duration(&self) -> Duration {
        match self.age {
            Some(age) if age < SENIOR_AGE => Duration::minutes(JUNIOR_GAME_MINS),
            _ => Duration::minutes(SENIOR_GAME_MINS),
        }
    }

    /// When the game ends.
    pub fn end(&self) -> ClockTime {
        self.start + self.duration()
    }

    /// Short text describing the fixture, used in segment notes.
    pub fn describe(&self) -> String {
        match &self.opponent {
            Some(opponent) => format!("{} vs {}", self.tournament, opponent),
            None => self.tournament.clone(),
        }
    }

    /// Label for travel notes: hall name plus match code when known.
    pub fn travel_label(&self) -> String {
        match self.match_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => format!("{} ({})", self.hall_name, code),
            _ => self.hall_name.clone(),
        }
    }
}

/// A travelling unit sharing lodging, a headcount and a game schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Squad {
    pub id: SquadId,
    pub name: String,
    pub headcount: u32,
    pub lodging: LodgingId,
    #[serde(default)]
    pub games: Vec<Game>,
}

impl Squad {
    /// Games on one service day, in kickoff order (ties broken by game id).
    pub fn games_on(&self, day: ServiceDay) -> Vec<&Game> {
        let mut games: Vec<&Game> = self.games.iter().filter(|g| g.day == day).collect();
        games.sort_by_key(|g| (g.start, g.id));
        games
    }

    /// Days on which the squad plays at least one game.
    pub fn game_days(&self) -> BTreeSet<ServiceDay> {
        self.games.iter().map(|g| g.day).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    fn game(id: u32, day: ServiceDay, start: &str, age: Option<u8>) -> Game {
        Game {
            id: GameId(id),
            tournament: "J12".into(),
            age,
            hall: HallId(1),
            hall_name: "Elverumshallen".into(),
            day,
            start: t(start),
            opponent: Some("Gjøvik".into()),
            match_code: Some(" A12 ".into()),
        }
    }

    #[test]
    fn duration_by_age() {
        assert_eq!(game(1, ServiceDay::Friday, "10:00", Some(12)).duration(), Duration::minutes(20));
        assert_eq!(game(1, ServiceDay::Friday, "10:00", Some(13)).duration(), Duration::minutes(25));
        assert_eq!(game(1, ServiceDay::Friday, "10:00", None).duration(), Duration::minutes(25));
        assert_eq!(game(1, ServiceDay::Friday, "10:00", Some(9)).end(), t("10:20"));
    }

    #[test]
    fn labels() {
        let g = game(1, ServiceDay::Friday, "10:00", None);
        assert_eq!(g.describe(), "J12 vs Gjøvik");
        assert_eq!(g.travel_label(), "Elverumshallen (A12)");
    }

    #[test]
    fn games_on_day_sorted() {
        let squad = Squad {
            id: SquadId(1),
            name: "Elverum J12-1".into(),
            headcount: 14,
            lodging: LodgingId(1),
            games: vec![
                game(3, ServiceDay::Saturday, "15:00", None),
                game(1, ServiceDay::Friday, "18:00", None),
                game(2, ServiceDay::Saturday, "09:00", None),
            ],
        };
        let ids: Vec<u32> = squad
            .games_on(ServiceDay::Saturday)
            .iter()
            .map(|g| g.id.0)
            .collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(
            squad.game_days().into_iter().collect::<Vec<_>>(),
            vec![ServiceDay::Friday, ServiceDay::Saturday]
        );
    }
}
