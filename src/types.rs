//! Common types shared by the rating calculators

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillError};
use crate::numerics::GaussianDistribution;

/// Default number of standard deviations subtracted for the conservative rating
pub const DEFAULT_CONSERVATIVE_MULTIPLIER: f64 = 3.0;

/// Partial-play weights are clamped to at least this value
pub const MIN_PARTIAL_PLAY_PERCENTAGE: f64 = 0.0001;

fn default_conservative_multiplier() -> f64 {
    DEFAULT_CONSERVATIVE_MULTIPLIER
}

/// Skill belief for one player: mean and standard deviation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub mean: f64,
    pub standard_deviation: f64,
    #[serde(default = "default_conservative_multiplier")]
    pub conservative_multiplier: f64,
}

impl Rating {
    pub fn new(mean: f64, standard_deviation: f64) -> Self {
        Self::with_multiplier(mean, standard_deviation, DEFAULT_CONSERVATIVE_MULTIPLIER)
    }

    pub fn with_multiplier(mean: f64, standard_deviation: f64, conservative_multiplier: f64) -> Self {
        Self {
            mean,
            standard_deviation,
            conservative_multiplier,
        }
    }

    pub fn variance(&self) -> f64 {
        self.standard_deviation * self.standard_deviation
    }

    /// Lower-bound estimate used for leaderboards
    pub fn conservative_rating(&self) -> f64 {
        self.mean - self.conservative_multiplier * self.standard_deviation
    }

    /// Move `update_percentage` of the way from `prior` to `full_posterior`
    /// in precision space. 0 keeps the prior, 1 takes the full posterior.
    pub fn partial_update(prior: &Rating, full_posterior: &Rating, update_percentage: f64) -> Rating {
        let prior_gaussian = GaussianDistribution::from(*prior);
        let posterior_gaussian = GaussianDistribution::from(*full_posterior);
        let partial = prior_gaussian.interpolate(&posterior_gaussian, update_percentage);

        Rating::with_multiplier(
            partial.mean(),
            partial.standard_deviation(),
            prior.conservative_multiplier,
        )
    }
}

impl From<Rating> for GaussianDistribution {
    fn from(rating: Rating) -> Self {
        GaussianDistribution::new(rating.mean, rating.standard_deviation)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mean={:.4}, standard deviation={:.4}",
            self.mean, self.standard_deviation
        )
    }
}

/// Parameters of the game being rated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameInfo {
    /// Mean of a new player's rating
    pub initial_mean: f64,
    /// Standard deviation of a new player's rating
    pub initial_standard_deviation: f64,
    /// Performance noise: the skill gap giving roughly 76% win chance
    pub beta: f64,
    /// Additive uncertainty applied before every game
    pub dynamics_factor: f64,
    /// Probability that two equally skilled players draw
    pub draw_probability: f64,
}

impl Default for GameInfo {
    fn default() -> Self {
        let initial_mean = 25.0;
        let initial_standard_deviation = initial_mean / 3.0;
        Self {
            initial_mean,
            initial_standard_deviation,
            beta: initial_standard_deviation / 2.0,
            dynamics_factor: initial_standard_deviation / 100.0,
            draw_probability: 0.10,
        }
    }
}

impl GameInfo {
    pub fn default_rating(&self) -> Rating {
        Rating::new(self.initial_mean, self.initial_standard_deviation)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.beta > 0.0) {
            return Err(SkillError::ConfigurationError {
                message: "Beta must be positive".to_string(),
            });
        }

        if !(self.initial_standard_deviation > 0.0) {
            return Err(SkillError::ConfigurationError {
                message: "Initial standard deviation must be positive".to_string(),
            });
        }

        if !(self.dynamics_factor >= 0.0) {
            return Err(SkillError::ConfigurationError {
                message: "Dynamics factor must be non-negative".to_string(),
            });
        }

        if !(0.0..1.0).contains(&self.draw_probability) {
            return Err(SkillError::ConfigurationError {
                message: format!(
                    "Draw probability must be in [0, 1), got {}",
                    self.draw_probability
                ),
            });
        }

        Ok(())
    }
}

/// Something that can be rated. Percentages default to full participation.
pub trait Participant {
    /// Fraction of the game this participant actually played
    fn partial_play_percentage(&self) -> f64 {
        1.0
    }

    /// Fraction of the computed rating change to apply
    fn partial_update_percentage(&self) -> f64 {
        1.0
    }
}

/// Everything a calculator needs from the key identifying a player.
pub trait PlayerKey: Participant + Clone + Eq + Hash + fmt::Display {}

impl<T: Participant + Clone + Eq + Hash + fmt::Display> PlayerKey for T {}

/// Partial-play weight of `participant`, clamped away from zero.
pub fn partial_play_percentage<P: Participant + ?Sized>(participant: &P) -> f64 {
    participant
        .partial_play_percentage()
        .max(MIN_PARTIAL_PLAY_PERCENTAGE)
}

macro_rules! full_time_participant {
    ($($t:ty),* $(,)?) => {
        $(impl Participant for $t {})*
    };
}

full_time_participant!(String, &str, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

/// A participant with explicit partial-play and partial-update percentages.
///
/// Equality and hashing only look at `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player<I> {
    pub id: I,
    #[serde(default = "full_percentage")]
    pub partial_play_percentage: f64,
    #[serde(default = "full_percentage")]
    pub partial_update_percentage: f64,
}

fn full_percentage() -> f64 {
    1.0
}

impl<I> Player<I> {
    pub fn new(id: I) -> Self {
        Self::with_percentages(id, 1.0, 1.0)
    }

    pub fn with_percentages(id: I, partial_play_percentage: f64, partial_update_percentage: f64) -> Self {
        Self {
            id,
            partial_play_percentage,
            partial_update_percentage,
        }
    }
}

impl<I> Participant for Player<I> {
    fn partial_play_percentage(&self) -> f64 {
        self.partial_play_percentage
    }

    fn partial_update_percentage(&self) -> f64 {
        self.partial_update_percentage
    }
}

impl<I: PartialEq> PartialEq for Player<I> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<I: Eq> Eq for Player<I> {}

impl<I: Hash> Hash for Player<I> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<I: fmt::Display> fmt::Display for Player<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Players on one side of a match with their ratings going in.
/// Insertion order is kept so graph construction is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team<K> {
    players: Vec<(K, Rating)>,
}

impl<K> Default for Team<K> {
    fn default() -> Self {
        Self {
            players: Vec::new(),
        }
    }
}

impl<K> Team<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_player(key: K, rating: Rating) -> Self {
        Self::new().add_player(key, rating)
    }

    pub fn add_player(mut self, key: K, rating: Rating) -> Self {
        self.players.push((key, rating));
        self
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn players(&self) -> &[(K, Rating)] {
        &self.players
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Rating)> {
        self.players.iter().map(|(key, rating)| (key, rating))
    }
}

impl<K> FromIterator<(K, Rating)> for Team<K> {
    fn from_iter<T: IntoIterator<Item = (K, Rating)>>(iter: T) -> Self {
        Self {
            players: iter.into_iter().collect(),
        }
    }
}
