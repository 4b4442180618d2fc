// Breed table - palette color plus time-varying tip extension-rate function
// per breed. Breed ids are validated here once, at entity construction, so
// the growth loop can index without runtime lookup faults.

use serde::{Deserialize, Serialize};

use crate::error::ColonyError;
use crate::types::Color;

/// Extension-rate function: elapsed colony time in seconds to extension
/// coefficient.
pub type RateFn = Box<dyn Fn(f32) -> f32 + Send + Sync>;

/// Per-breed parameters as they appear in configuration files.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BreedSpec {
    pub color: Color,
    /// Extension coefficient right after germination.
    pub initial_rate: f32,
    /// Steady-state coefficient the rate decays toward.
    pub steady_rate: f32,
    /// Decay time constant in seconds.
    pub decay_tau: f32,
}

pub struct BreedProfile {
    pub color: Color,
    pub rate: RateFn,
}

impl std::fmt::Debug for BreedProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreedProfile")
            .field("color", &self.color)
            .field("rate", &"<fn>")
            .finish()
    }
}

/// Palette and extension-rate table, indexed by breed id.
pub struct BreedTable {
    profiles: Vec<BreedProfile>,
}

impl BreedTable {
    /// Build the table from config specs. The default rate model decays
    /// exponentially from the initial rate toward the steady-state rate,
    /// matching the fast-then-steady tip extension dynamics of real hyphae.
    pub fn from_specs(specs: &[BreedSpec]) -> Self {
        let profiles = specs
            .iter()
            .map(|spec| {
                let initial = spec.initial_rate;
                let steady = spec.steady_rate;
                let tau = spec.decay_tau.max(f32::EPSILON);
                BreedProfile {
                    color: spec.color,
                    rate: Box::new(move |elapsed| {
                        steady + (initial - steady) * (-elapsed / tau).exp()
                    }),
                }
            })
            .collect();
        Self { profiles }
    }

    /// Single-breed table with a constant extension rate.
    pub fn constant(color: Color, rate: f32) -> Self {
        Self {
            profiles: vec![BreedProfile {
                color,
                rate: Box::new(move |_| rate),
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Resolve a breed id, failing fast on ids without a table entry.
    pub fn profile(&self, breed: usize) -> Result<&BreedProfile, ColonyError> {
        self.profiles.get(breed).ok_or(ColonyError::UnknownBreed {
            breed,
            known: self.profiles.len(),
        })
    }

    /// Evaluate a breed's extension rate at the given elapsed time.
    /// Breed ids are validated at entity construction, so indexing here is
    /// on the driver's guarantee.
    pub fn extension_rate(&self, breed: usize, elapsed: f32) -> f32 {
        (self.profiles[breed].rate)(elapsed)
    }
}
