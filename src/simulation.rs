// Simulation driver - owns the colony registry, the breed table and the
// clock, and runs the two-phase tick: entity transitions first, then the
// reproduce/death signals are drained into registry mutations, so the
// collections are never mutated while they are being iterated.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use crate::breed::BreedTable;
use crate::colony::{Fungi, Obstacle, ScarcityZone};
use crate::config::SimulationConfig;
use crate::error::ColonyError;
use crate::hypha::Hypha;
use crate::spore::Spore;

/// Colony statistics for overlays and the API.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Stats {
    pub hyphae_count: usize,
    pub spores_count: usize,
    pub obstacle_count: usize,
    pub scarcity_count: usize,
    pub frame_index: u64,
    pub elapsed_seconds: f32,
}

pub struct Simulation {
    pub fungi: Fungi,
    pub breeds: BreedTable,
    pub config: SimulationConfig,
    /// Monotonic colony time in seconds; advances `tick_seconds` per tick.
    pub elapsed: f32,
    pub frame_index: u64,
    pub paused: bool,
}

impl Simulation {
    pub fn new<R: Rng>(rng: &mut R) -> Result<Self, ColonyError> {
        Self::with_config(rng, SimulationConfig::default())
    }

    pub fn with_config<R: Rng>(
        rng: &mut R,
        config: SimulationConfig,
    ) -> Result<Self, ColonyError> {
        config.validate()?;
        let breeds = BreedTable::from_specs(&config.breeds);
        let mut sim = Self {
            fungi: Fungi::new(),
            breeds,
            config,
            elapsed: 0.0,
            frame_index: 0,
            paused: false,
        };
        sim.seed(rng)?;
        Ok(sim)
    }

    /// Scatter the initial root spores, obstacles and scarcity zones over
    /// the interior of the simulation area.
    fn seed<R: Rng>(&mut self, rng: &mut R) -> Result<(), ColonyError> {
        let width = self.config.width;
        let height = self.config.height;
        for _ in 0..self.config.initial_spore_count {
            let x = rng.gen_range(1.0..width - 1.0);
            let y = rng.gen_range(1.0..height - 1.0);
            let breed = rng.gen_range(0..self.breeds.len());
            let spore = Spore::new(x, y, breed, &self.config.spore, false, &self.breeds)?;
            self.fungi.add_spore(spore);
        }
        for _ in 0..self.config.obstacle_count {
            self.fungi.add_obstacle(Obstacle {
                x: rng.gen_range(1.0..width - 1.0),
                y: rng.gen_range(1.0..height - 1.0),
                radius: rng.gen_range(4.0..24.0),
            });
        }
        for _ in 0..self.config.scarcity_count {
            self.fungi.add_scarcity(ScarcityZone {
                x: rng.gen_range(1.0..width - 1.0),
                y: rng.gen_range(1.0..height - 1.0),
                radius: rng.gen_range(20.0..80.0),
                severity: rng.gen_range(0.2..1.0),
            });
        }
        tracing::debug!(
            spores = self.fungi.spores().len(),
            obstacles = self.fungi.obstacles().len(),
            scarcities = self.fungi.scarcities().len(),
            "seeded colony"
        );
        Ok(())
    }

    pub fn reset<R: Rng>(&mut self, rng: &mut R) -> Result<(), ColonyError> {
        self.fungi = Fungi::new();
        self.elapsed = 0.0;
        self.frame_index = 0;
        self.seed(rng)
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn stats(&self) -> Stats {
        Stats {
            hyphae_count: self.fungi.hyphae().len(),
            spores_count: self.fungi.spores().len(),
            obstacle_count: self.fungi.obstacles().len(),
            scarcity_count: self.fungi.scarcities().len(),
            frame_index: self.frame_index,
            elapsed_seconds: self.elapsed,
        }
    }

    pub fn spawn_spore_at(&mut self, x: f32, y: f32, breed: usize) -> Result<u64, ColonyError> {
        let spore = Spore::new(x, y, breed, &self.config.spore, false, &self.breeds)?;
        Ok(self.fungi.add_spore(spore))
    }

    pub fn spawn_hypha_at<R: Rng>(
        &mut self,
        rng: &mut R,
        x: f32,
        y: f32,
        breed: usize,
    ) -> Result<u64, ColonyError> {
        let hypha = Hypha::new(x, y, breed, &self.config.hypha, &self.breeds, rng)?;
        Ok(self.fungi.add_hypha(hypha))
    }

    /// Advance the colony by one tick.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> Result<(), ColonyError> {
        self.frame_index = self.frame_index.wrapping_add(1);
        self.elapsed += self.config.tick_seconds;

        self.transition_phase(rng);
        self.apply_phase(rng)
    }

    /// Phase 1: every entity's transition runs against its own state plus
    /// independent random draws only. Above `parallel_threshold` the hypha
    /// transitions fan out over rayon; per-entity ChaCha streams seeded from
    /// the master source keep the draws statistically independent.
    fn transition_phase<R: Rng>(&mut self, rng: &mut R) {
        let bounds = self.config.bounds();
        let elapsed = self.elapsed;
        let threshold = self.config.parallel_threshold;
        let breeds = &self.breeds;
        let hyphae = self.fungi.hyphae_mut();

        if hyphae.len() >= threshold.max(1) {
            let seeds: Vec<u64> = (0..hyphae.len()).map(|_| rng.gen()).collect();
            hyphae
                .par_iter_mut()
                .zip(seeds.into_par_iter())
                .for_each(|(hypha, seed)| {
                    let mut stream = ChaCha8Rng::seed_from_u64(seed);
                    let coefficient = breeds.extension_rate(hypha.breed_id, elapsed);
                    hypha.update(&mut stream, coefficient, bounds);
                });
        } else {
            for hypha in hyphae.iter_mut() {
                let coefficient = breeds.extension_rate(hypha.breed_id, elapsed);
                hypha.update(rng, coefficient, bounds);
            }
        }

        for spore in self.fungi.spores_mut() {
            spore.update(rng);
        }
    }

    /// Phase 2: drain the reproduce/death signals collected in phase 1 into
    /// registry mutations.
    fn apply_phase<R: Rng>(&mut self, rng: &mut R) -> Result<(), ColonyError> {
        // Branch events: sibling hypha at the parent's tip, same breed,
        // fresh direction; occasionally a spore marks the branch point.
        let mut branch_points = Vec::new();
        for hypha in self.fungi.hyphae_mut() {
            if hypha.alive && hypha.take_reproduce() {
                branch_points.push((hypha.tip_x, hypha.tip_y, hypha.breed_id));
            }
        }
        let branches = branch_points.len();
        for (x, y, breed) in branch_points {
            let branch = Hypha::new(x, y, breed, &self.config.hypha, &self.breeds, rng)?;
            self.fungi.add_hypha(branch);
            if rng.gen::<f32>() < self.config.branch_spore_probability {
                let spore = Spore::new(x, y, breed, &self.config.spore, true, &self.breeds)?;
                self.fungi.add_spore(spore);
            }
        }

        // Germinations: one hypha per sprouting spore; the spore retires.
        let mut germinated = Vec::new();
        for spore in self.fungi.spores_mut() {
            if spore.alive && spore.take_reproduce() {
                germinated.push((spore.id, spore.origin_x, spore.origin_y, spore.breed_id));
            }
        }
        let germinations = germinated.len();
        for (id, x, y, breed) in germinated {
            let hypha = Hypha::new(x, y, breed, &self.config.hypha, &self.breeds, rng)?;
            self.fungi.add_hypha(hypha);
            self.fungi.kill_spore(id)?;
        }

        let dead_hyphae: Vec<u64> = self
            .fungi
            .hyphae()
            .iter()
            .filter(|h| !h.alive)
            .map(|h| h.id)
            .collect();
        for id in dead_hyphae {
            self.fungi.kill_hypha(id)?;
        }
        let dead_spores: Vec<u64> = self
            .fungi
            .spores()
            .iter()
            .filter(|s| !s.alive)
            .map(|s| s.id)
            .collect();
        for id in dead_spores {
            self.fungi.kill_spore(id)?;
        }

        tracing::debug!(
            frame = self.frame_index,
            hyphae = self.fungi.hyphae().len(),
            spores = self.fungi.spores().len(),
            branches,
            germinations,
            "tick applied"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    fn quiet_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.initial_spore_count = 0;
        config.obstacle_count = 0;
        config.scarcity_count = 0;
        config.branch_spore_probability = 0.0;
        config.spore.death_probability = 0.0;
        config.spore.growth_probability = 0.0;
        config.hypha.death_probability = 0.0;
        config.hypha.branching_probability = 0.0;
        config
    }

    #[test]
    fn branch_event_spawns_a_sibling_with_the_parent_breed() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut config = quiet_config();
        config.hypha.branching_probability = 1.0;
        let mut sim = Simulation::with_config(&mut rng, config).unwrap();
        sim.spawn_hypha_at(&mut rng, 400.0, 300.0, 1).unwrap();

        sim.step(&mut rng).unwrap();
        assert_eq!(sim.fungi.hyphae().len(), 2);
        assert!(sim.fungi.hyphae().iter().all(|h| h.breed_id == 1));

        // Every survivor branches again.
        sim.step(&mut rng).unwrap();
        assert_eq!(sim.fungi.hyphae().len(), 4);
    }

    #[test]
    fn branch_sibling_originates_at_the_parent_tip() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut config = quiet_config();
        config.hypha.branching_probability = 1.0;
        let mut sim = Simulation::with_config(&mut rng, config).unwrap();
        let parent = sim.spawn_hypha_at(&mut rng, 400.0, 300.0, 0).unwrap();

        sim.step(&mut rng).unwrap();
        let parent_tip = {
            let parent = sim.fungi.hyphae().iter().find(|h| h.id == parent).unwrap();
            (parent.tip_x, parent.tip_y)
        };
        let child = sim.fungi.hyphae().iter().find(|h| h.id != parent).unwrap();
        assert_eq!((child.origin_x, child.origin_y), parent_tip);
    }

    #[test]
    fn germination_spawns_a_hypha_and_retires_the_spore() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut config = quiet_config();
        config.initial_spore_count = 4;
        config.spore.growth_probability = 1.0;
        let mut sim = Simulation::with_config(&mut rng, config).unwrap();
        assert_eq!(sim.fungi.spores().len(), 4);

        sim.step(&mut rng).unwrap();
        assert_eq!(sim.fungi.hyphae().len(), 4);
        assert_eq!(sim.fungi.spores().len(), 0);
    }

    #[test]
    fn dead_entities_leave_the_registry_the_same_tick() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut config = quiet_config();
        config.initial_spore_count = 3;
        config.spore.death_probability = 1.0;
        config.hypha.death_probability = 1.0;
        let mut sim = Simulation::with_config(&mut rng, config).unwrap();
        sim.spawn_hypha_at(&mut rng, 400.0, 300.0, 0).unwrap();

        sim.step(&mut rng).unwrap();
        assert_eq!(sim.fungi.hyphae().len(), 0);
        assert_eq!(sim.fungi.spores().len(), 0);
    }

    #[test]
    fn branch_spores_are_marked_from_hypha() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut config = quiet_config();
        config.hypha.branching_probability = 1.0;
        config.branch_spore_probability = 1.0;
        let mut sim = Simulation::with_config(&mut rng, config).unwrap();
        sim.spawn_hypha_at(&mut rng, 400.0, 300.0, 0).unwrap();

        sim.step(&mut rng).unwrap();
        assert_eq!(sim.fungi.spores().len(), 1);
        assert!(sim.fungi.spores()[0].from_hypha);
    }

    #[test]
    fn clock_advances_tick_seconds_per_step() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut config = quiet_config();
        config.tick_seconds = 0.25;
        let mut sim = Simulation::with_config(&mut rng, config).unwrap();
        for _ in 0..4 {
            sim.step(&mut rng).unwrap();
        }
        assert_eq!(sim.frame_index, 4);
        assert!((sim.elapsed - 1.0).abs() < 1e-6);
    }

    #[test]
    fn parallel_transition_upholds_the_clamp_invariant() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut config = quiet_config();
        config.parallel_threshold = 1; // force the rayon path
        config.hypha.branching_probability = 0.2;
        let mut sim = Simulation::with_config(&mut rng, config).unwrap();
        for _ in 0..32 {
            let x = rng.gen_range(1.0..799.0);
            let y = rng.gen_range(1.0..599.0);
            sim.spawn_hypha_at(&mut rng, x, y, 0).unwrap();
        }

        for _ in 0..50 {
            sim.step(&mut rng).unwrap();
        }
        for hypha in sim.fungi.hyphae() {
            assert!(hypha.tip_x >= 1.0 && hypha.tip_x <= 799.0);
            assert!(hypha.tip_y >= 1.0 && hypha.tip_y <= 599.0);
            assert!(hypha.alive);
        }
    }

    #[test]
    fn reset_reseeds_the_colony() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut config = quiet_config();
        config.initial_spore_count = 6;
        let mut sim = Simulation::with_config(&mut rng, config).unwrap();
        for _ in 0..10 {
            sim.step(&mut rng).unwrap();
        }
        sim.reset(&mut rng).unwrap();
        assert_eq!(sim.frame_index, 0);
        assert_eq!(sim.elapsed, 0.0);
        assert_eq!(sim.fungi.spores().len(), 6);
        assert_eq!(sim.fungi.hyphae().len(), 0);
    }

    #[test]
    fn stats_mirror_the_registry() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut config = quiet_config();
        config.initial_spore_count = 2;
        config.obstacle_count = 3;
        config.scarcity_count = 1;
        let sim = Simulation::with_config(&mut rng, config).unwrap();
        let stats = sim.stats();
        assert_eq!(stats.spores_count, 2);
        assert_eq!(stats.obstacle_count, 3);
        assert_eq!(stats.scarcity_count, 1);
        assert_eq!(stats.hyphae_count, 0);
        assert_eq!(stats.frame_index, 0);
    }
}
