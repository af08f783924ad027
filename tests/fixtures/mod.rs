//! Shared builders and assertions for integration testing

#![allow(dead_code)]

use skill_graph::{GameInfo, Player, Rating, Team};

/// Tolerance used when comparing against published TrueSkill results
pub const TOLERANCE: f64 = 1e-3;

pub fn default_game() -> GameInfo {
    GameInfo::default()
}

/// Game with no dynamics so results line up with calculators that add none
pub fn static_game() -> GameInfo {
    GameInfo {
        dynamics_factor: 0.0,
        ..GameInfo::default()
    }
}

/// One team per id, each player starting from the game's default rating.
pub fn free_for_all(game_info: &GameInfo, ids: &[&'static str]) -> Vec<Team<&'static str>> {
    ids.iter()
        .map(|id| Team::with_player(*id, game_info.default_rating()))
        .collect()
}

/// A team of default-rated players.
pub fn default_team(game_info: &GameInfo, ids: &[&'static str]) -> Team<&'static str> {
    ids.iter()
        .map(|id| (*id, game_info.default_rating()))
        .collect()
}

/// A team of players with explicit partial-play and partial-update percentages.
pub fn part_timers(
    game_info: &GameInfo,
    players: &[(&'static str, f64, f64)],
) -> Team<Player<&'static str>> {
    players
        .iter()
        .map(|(id, play, update)| {
            (
                Player::with_percentages(*id, *play, *update),
                game_info.default_rating(),
            )
        })
        .collect()
}

pub fn assert_rating_near(rating: &Rating, mean: f64, standard_deviation: f64, tolerance: f64) {
    assert!(
        (rating.mean - mean).abs() < tolerance,
        "mean {:.6} differs from expected {:.6}",
        rating.mean,
        mean
    );
    assert!(
        (rating.standard_deviation - standard_deviation).abs() < tolerance,
        "standard deviation {:.6} differs from expected {:.6}",
        rating.standard_deviation,
        standard_deviation
    );
}

pub fn assert_rating(rating: &Rating, mean: f64, standard_deviation: f64) {
    assert_rating_near(rating, mean, standard_deviation, TOLERANCE);
}
