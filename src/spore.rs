use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::breed::BreedTable;
use crate::error::{probability, ColonyError};
use crate::types::Color;

/// Dormancy parameters shared by every spore of a colony.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SporeParams {
    pub growth_probability: f32,
    pub death_probability: f32,
}

impl Default for SporeParams {
    fn default() -> Self {
        Self {
            growth_probability: 0.02,
            death_probability: 0.0005,
        }
    }
}

impl SporeParams {
    pub fn validate(&self) -> Result<(), ColonyError> {
        probability("growth_probability", self.growth_probability)?;
        probability("death_probability", self.death_probability)?;
        Ok(())
    }
}

/// A dormant unit at a fixed origin. Each tick it either dies, germinates
/// (reproduce signal - the driver spawns a hypha there and retires the
/// spore), or stays dormant.
#[derive(Clone, Debug)]
pub struct Spore {
    /// Registry-assigned id; 0 until the spore is added to the colony.
    pub id: u64,
    pub origin_x: f32,
    pub origin_y: f32,
    pub growth_probability: f32,
    pub death_probability: f32,
    pub alive: bool,
    pub reproduce: bool,
    pub breed_id: usize,
    /// True when the spore was dropped at a hypha branch point rather than
    /// seeded as a root.
    pub from_hypha: bool,
    pub color: Color,
}

impl Spore {
    pub fn new(
        origin_x: f32,
        origin_y: f32,
        breed_id: usize,
        params: &SporeParams,
        from_hypha: bool,
        breeds: &BreedTable,
    ) -> Result<Self, ColonyError> {
        params.validate()?;
        let color = breeds.profile(breed_id)?.color;
        Ok(Self {
            id: 0,
            origin_x,
            origin_y,
            growth_probability: params.growth_probability,
            death_probability: params.death_probability,
            alive: true,
            reproduce: false,
            breed_id,
            from_hypha,
            color,
        })
    }

    /// One dormancy tick. Death is checked first and is terminal; growth is
    /// only evaluated while still alive, so at most one flag flips per tick.
    pub fn update<R: Rng>(&mut self, rng: &mut R) {
        if rng.gen::<f32>() < self.death_probability {
            self.alive = false;
            return;
        }
        if rng.gen::<f32>() < self.growth_probability {
            self.reproduce = true;
        }
    }

    /// Consume the germination signal.
    pub fn take_reproduce(&mut self) -> bool {
        std::mem::take(&mut self.reproduce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table() -> BreedTable {
        BreedTable::constant(Color::new(222, 210, 180), 5.0)
    }

    fn spore(growth: f32, death: f32) -> Spore {
        let params = SporeParams {
            growth_probability: growth,
            death_probability: death,
        };
        Spore::new(100.0, 100.0, 0, &params, false, &table()).unwrap()
    }

    #[test]
    fn certain_death_kills_on_first_update_regardless_of_growth() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut spore = spore(1.0, 1.0);
        spore.update(&mut rng);
        assert!(!spore.alive);
        assert!(!spore.reproduce);
    }

    #[test]
    fn certain_growth_reproduces_on_first_update() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut spore = spore(1.0, 0.0);
        spore.update(&mut rng);
        assert!(spore.alive);
        assert!(spore.reproduce);
    }

    #[test]
    fn dormant_spore_stays_dormant() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut spore = spore(0.0, 0.0);
        for _ in 0..100 {
            spore.update(&mut rng);
        }
        assert!(spore.alive);
        assert!(!spore.reproduce);
    }

    #[test]
    fn take_reproduce_consumes_the_signal() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut spore = spore(1.0, 0.0);
        spore.update(&mut rng);
        assert!(spore.take_reproduce());
        assert!(!spore.take_reproduce());
    }

    #[test]
    fn out_of_range_probability_fails_at_construction() {
        let params = SporeParams {
            growth_probability: 1.5,
            death_probability: 0.0,
        };
        assert!(matches!(
            Spore::new(0.0, 0.0, 0, &params, false, &table()),
            Err(ColonyError::ProbabilityOutOfRange { .. })
        ));
    }

    #[test]
    fn unresolvable_breed_fails_at_construction() {
        assert_eq!(
            Spore::new(0.0, 0.0, 7, &SporeParams::default(), false, &table()).unwrap_err(),
            ColonyError::UnknownBreed { breed: 7, known: 1 }
        );
    }
}
