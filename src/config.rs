// Simulation configuration - bounds, seeding counts, per-entity parameter
// blocks and the breed palette/rate specs. Loadable from YAML or JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::breed::BreedSpec;
use crate::error::{probability, ColonyError};
use crate::hypha::HyphaParams;
use crate::spore::SporeParams;
use crate::types::{Bounds, Color};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // Simulation area
    pub width: f32,
    pub height: f32,

    /// Seconds of colony time added per tick.
    pub tick_seconds: f32,

    // Seeding
    pub initial_spore_count: usize,
    pub obstacle_count: usize,
    pub scarcity_count: usize,

    /// Chance that a branch event also drops a spore at the branch point.
    pub branch_spore_probability: f32,

    /// Live-hypha count at which the transition phase fans out over rayon.
    pub parallel_threshold: usize,

    pub spore: SporeParams,
    pub hypha: HyphaParams,
    pub breeds: Vec<BreedSpec>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            tick_seconds: 1.0 / 60.0,
            initial_spore_count: 12,
            obstacle_count: 30,
            scarcity_count: 6,
            branch_spore_probability: 0.1,
            parallel_threshold: 4096,
            spore: SporeParams::default(),
            hypha: HyphaParams::default(),
            breeds: default_breeds(),
        }
    }
}

fn default_breeds() -> Vec<BreedSpec> {
    vec![
        BreedSpec {
            color: Color::new(222, 210, 180),
            initial_rate: 80.0,
            steady_rate: 5.0,
            decay_tau: 5.0,
        },
        BreedSpec {
            color: Color::new(176, 196, 222),
            initial_rate: 60.0,
            steady_rate: 4.0,
            decay_tau: 8.0,
        },
        BreedSpec {
            color: Color::new(189, 153, 201),
            initial_rate: 40.0,
            steady_rate: 6.0,
            decay_tau: 3.0,
        },
    ]
}

impl SimulationConfig {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }

    /// Fail fast on parameters the growth model would otherwise trip over
    /// mid-run.
    pub fn validate(&self) -> Result<(), ColonyError> {
        self.spore.validate()?;
        self.hypha.validate()?;
        probability("branch_spore_probability", self.branch_spore_probability)?;
        if self.breeds.is_empty() {
            return Err(ColonyError::UnknownBreed { breed: 0, known: 0 });
        }
        Ok(())
    }

    /// Load from an explicit path; YAML or JSON picked by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&contents)?,
            _ => serde_yaml::from_str(&contents)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Search the working directory for config.yaml, config.yml or
    /// config.json; fall back to defaults.
    pub fn from_default_paths() -> Self {
        for candidate in ["config.yaml", "config.yml", "config.json"] {
            if Path::new(candidate).exists() {
                match Self::from_file(candidate) {
                    Ok(config) => {
                        tracing::info!(path = candidate, "loaded configuration");
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!(path = candidate, error = %e, "ignoring unreadable config");
                    }
                }
            }
        }
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        SimulationConfig::default().validate().unwrap();
    }

    #[test]
    fn yaml_round_trip_preserves_the_config() {
        let config = SimulationConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: SimulationConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.width, config.width);
        assert_eq!(back.breeds.len(), config.breeds.len());
        assert_eq!(back.hypha.k_s, config.hypha.k_s);
        back.validate().unwrap();
    }

    #[test]
    fn json_round_trip_preserves_the_config() {
        let config = SimulationConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.height, config.height);
        assert_eq!(back.spore.growth_probability, config.spore.growth_probability);
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let back: SimulationConfig = serde_yaml::from_str("width: 400.0\n").unwrap();
        assert_eq!(back.width, 400.0);
        assert_eq!(back.height, 600.0);
        assert_eq!(back.breeds.len(), 3);
    }

    #[test]
    fn invalid_probability_is_rejected() {
        let mut config = SimulationConfig::default();
        config.spore.death_probability = 2.0;
        assert!(matches!(
            config.validate(),
            Err(ColonyError::ProbabilityOutOfRange { .. })
        ));
    }

    #[test]
    fn empty_breed_table_is_rejected() {
        let mut config = SimulationConfig::default();
        config.breeds.clear();
        assert!(config.validate().is_err());
    }
}
