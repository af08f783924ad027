//! Rating calculator trait and shared validation
//!
//! This module defines the interface every skill calculator exposes and the
//! team/player count checks they all run before doing any math.

use std::collections::HashMap;
use std::fmt;
use std::ops::BitOr;

use crate::error::{Result, SkillError};
use crate::numerics::{PlayersRange, TeamsRange};
use crate::types::{GameInfo, PlayerKey, Rating, Team};

/// Optional features a calculator honours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SupportedOptions(u8);

impl SupportedOptions {
    pub const NONE: SupportedOptions = SupportedOptions(0);
    /// Players may have played only part of the game
    pub const PARTIAL_PLAY: SupportedOptions = SupportedOptions(1);
    /// Players may receive only part of their rating change
    pub const PARTIAL_UPDATE: SupportedOptions = SupportedOptions(2);

    pub fn contains(&self, other: SupportedOptions) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SupportedOptions {
    type Output = SupportedOptions;

    fn bitor(self, rhs: SupportedOptions) -> SupportedOptions {
        SupportedOptions(self.0 | rhs.0)
    }
}

impl fmt::Display for SupportedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(SupportedOptions::PARTIAL_PLAY) {
            names.push("PartialPlay");
        }
        if self.contains(SupportedOptions::PARTIAL_UPDATE) {
            names.push("PartialUpdate");
        }
        if names.is_empty() {
            names.push("None");
        }
        write!(f, "{}", names.join(" | "))
    }
}

/// Trait for calculating rating changes after games
pub trait SkillCalculator {
    fn supported_options(&self) -> SupportedOptions;

    fn teams_allowed(&self) -> TeamsRange;

    fn players_per_team_allowed(&self) -> PlayersRange;

    /// Calculate posterior ratings for every player.
    ///
    /// # Arguments
    /// * `teams` - Teams with each player's rating going into the game
    /// * `team_ranks` - One rank per team where 1 = first place; equal ranks are draws
    fn calculate_new_ratings<K: PlayerKey>(
        &self,
        game_info: &GameInfo,
        teams: &[Team<K>],
        team_ranks: &[u32],
    ) -> Result<HashMap<K, Rating>>;

    /// Probability-like score (0.0 to 1.0) that the match ends in a draw;
    /// higher means a more even match.
    fn calculate_match_quality<K: PlayerKey>(&self, game_info: &GameInfo, teams: &[Team<K>]) -> Result<f64>;

    fn is_supported(&self, option: SupportedOptions) -> bool {
        self.supported_options().contains(option)
    }

    /// Reject team lists this calculator cannot handle.
    fn validate_team_count_and_players_count_per_team<K>(&self, teams: &[Team<K>]) -> Result<()> {
        let players_allowed = self.players_per_team_allowed();
        for (index, team) in teams.iter().enumerate() {
            if !players_allowed.is_in_range(team.len()) {
                return Err(SkillError::invalid_argument(format!(
                    "team {} has {} players, expected {}",
                    index,
                    team.len(),
                    players_allowed
                )));
            }
        }

        let teams_allowed = self.teams_allowed();
        if !teams_allowed.is_in_range(teams.len()) {
            return Err(SkillError::invalid_argument(format!(
                "got {} teams, expected {}",
                teams.len(),
                teams_allowed
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRanges {
        teams: TeamsRange,
        players: PlayersRange,
    }

    impl SkillCalculator for FixedRanges {
        fn supported_options(&self) -> SupportedOptions {
            SupportedOptions::PARTIAL_PLAY
        }

        fn teams_allowed(&self) -> TeamsRange {
            self.teams
        }

        fn players_per_team_allowed(&self) -> PlayersRange {
            self.players
        }

        fn calculate_new_ratings<K: PlayerKey>(
            &self,
            _game_info: &GameInfo,
            teams: &[Team<K>],
            _team_ranks: &[u32],
        ) -> Result<HashMap<K, Rating>> {
            self.validate_team_count_and_players_count_per_team(teams)?;
            Ok(teams
                .iter()
                .flat_map(|team| team.iter())
                .map(|(key, rating)| (key.clone(), *rating))
                .collect())
        }

        fn calculate_match_quality<K: PlayerKey>(&self, _game_info: &GameInfo, teams: &[Team<K>]) -> Result<f64> {
            self.validate_team_count_and_players_count_per_team(teams)?;
            Ok(1.0)
        }
    }

    fn one_on_one() -> Vec<Team<&'static str>> {
        vec![
            Team::with_player("a", Rating::new(25.0, 8.0)),
            Team::with_player("b", Rating::new(25.0, 8.0)),
        ]
    }

    #[test]
    fn test_supported_options() {
        let both = SupportedOptions::PARTIAL_PLAY | SupportedOptions::PARTIAL_UPDATE;
        assert!(both.contains(SupportedOptions::PARTIAL_PLAY));
        assert!(both.contains(SupportedOptions::PARTIAL_UPDATE));
        assert!(!SupportedOptions::PARTIAL_PLAY.contains(SupportedOptions::PARTIAL_UPDATE));
        assert_eq!(both.to_string(), "PartialPlay | PartialUpdate");
        assert_eq!(SupportedOptions::NONE.to_string(), "None");
    }

    #[test]
    fn test_validation_accepts_in_range() {
        let calculator = FixedRanges {
            teams: TeamsRange::exactly(2),
            players: PlayersRange::at_least(1),
        };
        assert!(calculator.is_supported(SupportedOptions::PARTIAL_PLAY));
        assert!(!calculator.is_supported(SupportedOptions::PARTIAL_UPDATE));
        assert_eq!(calculator.calculate_match_quality(&GameInfo::default(), &one_on_one()).unwrap(), 1.0);
    }

    #[test]
    fn test_validation_rejects_team_count() {
        let calculator = FixedRanges {
            teams: TeamsRange::exactly(3),
            players: PlayersRange::at_least(1),
        };
        let result = calculator.calculate_new_ratings(&GameInfo::default(), &one_on_one(), &[1, 2]);
        assert!(matches!(result, Err(SkillError::InvalidArgument { .. })));
    }

    #[test]
    fn test_validation_rejects_empty_team() {
        let calculator = FixedRanges {
            teams: TeamsRange::at_least(2),
            players: PlayersRange::at_least(1),
        };
        let teams = vec![Team::with_player("a", Rating::new(25.0, 8.0)), Team::new()];
        let err = calculator
            .validate_team_count_and_players_count_per_team(&teams)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: team 1 has 0 players, expected at least 1"
        );
    }
}
