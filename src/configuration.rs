use std::{env, time::Duration};

use thiserror::Error;

use crate::snake::{Mode, SnakeGame};

pub const MODE_VAR: &str = "SNAKE_MODE";
pub const TICK_MS_VAR: &str = "SNAKE_TICK_MS";
pub const SEED_VAR: &str = "SNAKE_SEED";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("{var} has an invalid value {value:?}")]
    InvalidValue { var: &'static str, value: String },
    #[error("SNAKE_TICK_MS must be greater than zero")]
    ZeroTick,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfiguration {
    pub tick_interval: Duration,
    /// Mode of the first game. Later games keep whatever the player picked.
    pub mode: Mode,
    /// Fixes the food sequence, mostly useful to replay a game.
    pub seed: Option<u64>,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for GameConfiguration {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(150),
            mode: Mode::Walls,
            seed: None,
            window_width: 420.,
            window_height: 460.,
        }
    }
}

impl GameConfiguration {
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigurationError> {
        let mut configuration = Self::default();

        if let Some(value) = lookup(MODE_VAR) {
            configuration.mode = value.parse().map_err(|_| ConfigurationError::InvalidValue {
                var: MODE_VAR,
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup(TICK_MS_VAR) {
            let millis: u64 =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigurationError::InvalidValue {
                        var: TICK_MS_VAR,
                        value: value.clone(),
                    })?;
            if millis == 0 {
                return Err(ConfigurationError::ZeroTick);
            }
            configuration.tick_interval = Duration::from_millis(millis);
        }

        if let Some(value) = lookup(SEED_VAR) {
            let seed = value
                .trim()
                .parse()
                .map_err(|_| ConfigurationError::InvalidValue {
                    var: SEED_VAR,
                    value: value.clone(),
                })?;
            configuration.seed = Some(seed);
        }

        Ok(configuration)
    }

    pub fn new_game(&self) -> SnakeGame {
        match self.seed {
            Some(seed) => SnakeGame::with_seed(self.mode, seed),
            None => SnakeGame::new(self.mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use super::*;
    use crate::snake::{Direction, FOOD_SCORE};

    fn lookup(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<_, _> = vars.iter().copied().collect();
        move |var| vars.get(var).map(|v| v.to_string())
    }

    #[test]
    fn test_defaults_without_variables() {
        let configuration = GameConfiguration::from_lookup(lookup(&[])).unwrap();
        assert_eq!(configuration, GameConfiguration::default());
        assert_eq!(configuration.tick_interval, Duration::from_millis(150));
        assert_eq!(configuration.mode, Mode::Walls);
    }

    #[test]
    fn test_variables_override_defaults() {
        let configuration = GameConfiguration::from_lookup(lookup(&[
            (MODE_VAR, "pass-through"),
            (TICK_MS_VAR, "80"),
            (SEED_VAR, "1234"),
        ]))
        .unwrap();

        assert_eq!(configuration.mode, Mode::PassThrough);
        assert_eq!(configuration.tick_interval, Duration::from_millis(80));
        assert_eq!(configuration.seed, Some(1234));
        assert_eq!(configuration.new_game().mode(), Mode::PassThrough);
    }

    #[test]
    fn test_invalid_variables() {
        assert_eq!(
            GameConfiguration::from_lookup(lookup(&[(MODE_VAR, "lava")])),
            Err(ConfigurationError::InvalidValue {
                var: MODE_VAR,
                value: "lava".to_string()
            })
        );
        assert_eq!(
            GameConfiguration::from_lookup(lookup(&[(TICK_MS_VAR, "fast")])),
            Err(ConfigurationError::InvalidValue {
                var: TICK_MS_VAR,
                value: "fast".to_string()
            })
        );
        assert_eq!(
            GameConfiguration::from_lookup(lookup(&[(TICK_MS_VAR, "0")])),
            Err(ConfigurationError::ZeroTick)
        );
    }

    #[test]
    fn test_seeded_games_share_food_sequence() {
        let configuration = GameConfiguration {
            seed: Some(9),
            ..Default::default()
        };
        let mut a = configuration.new_game();
        let mut b = configuration.new_game();
        for game in [&mut a, &mut b] {
            game.start(Direction::Right);
            for _ in 0..5 {
                game.tick();
            }
            game.request_direction(Direction::Down);
            for _ in 0..5 {
                game.tick();
            }
            assert_eq!(game.score(), FOOD_SCORE);
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }
}
