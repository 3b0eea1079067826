//! Search configuration.

/// Parameters controlling a PUCT search.
#[derive(Clone, Debug)]
pub struct MctsConfig {
    /// Number of simulations per search call.
    pub num_simulations: usize,

    /// Exploration constant in the PUCT formula.
    pub c_puct: f32,

    /// Dirichlet noise concentration for root exploration.
    /// Higher values spread the noise, lower values concentrate it.
    pub dirichlet_alpha: f32,

    /// Fraction of each root prior replaced with Dirichlet noise.
    /// 0 disables noise and keeps searches fully deterministic.
    pub exploration_fraction: f32,

    /// Maximum entries in the inference cache. 0 disables caching.
    pub cache_capacity: usize,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: 800,
            c_puct: 1.0,
            dirichlet_alpha: 0.3,
            exploration_fraction: 0.0,
            cache_capacity: 50_000,
        }
    }
}

impl MctsConfig {
    /// Default config with the given simulation count.
    pub fn with_simulations(num_simulations: usize) -> Self {
        Self {
            num_simulations,
            ..Default::default()
        }
    }
}
