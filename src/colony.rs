// Colony registry - owns every live entity plus the inert geometry the
// growth model can consult. Pure bookkeeping; never inspects entity state.

use serde::{Deserialize, Serialize};

use crate::error::ColonyError;
use crate::hypha::Hypha;
use crate::spore::Spore;

/// Inert circular blocker.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Inert circular low-resource region.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ScarcityZone {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// 0.0 = no shortage, 1.0 = fully depleted.
    pub severity: f32,
}

/// The colony registry. Collections are unordered; removal may reorder.
/// Entities carry a registry-assigned id and appear in at most one
/// collection, only while alive.
#[derive(Default)]
pub struct Fungi {
    hyphae: Vec<Hypha>,
    spores: Vec<Spore>,
    obstacles: Vec<Obstacle>,
    scarcities: Vec<ScarcityZone>,
    next_id: u64,
}

impl Fungi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_hypha(&mut self, mut hypha: Hypha) -> u64 {
        let id = self.assign_id();
        hypha.id = id;
        self.hyphae.push(hypha);
        id
    }

    pub fn add_spore(&mut self, mut spore: Spore) -> u64 {
        let id = self.assign_id();
        spore.id = id;
        self.spores.push(spore);
        id
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    pub fn add_scarcity(&mut self, zone: ScarcityZone) {
        self.scarcities.push(zone);
    }

    /// Remove a hypha by id. Killing an id that is not registered is a
    /// driver bug and is reported loudly, never swallowed.
    pub fn kill_hypha(&mut self, id: u64) -> Result<(), ColonyError> {
        match self.hyphae.iter().position(|h| h.id == id) {
            Some(index) => {
                self.hyphae.swap_remove(index);
                Ok(())
            }
            None => Err(ColonyError::NotRegistered { kind: "hypha", id }),
        }
    }

    /// Remove a spore by id. Same contract as [`Fungi::kill_hypha`].
    pub fn kill_spore(&mut self, id: u64) -> Result<(), ColonyError> {
        match self.spores.iter().position(|s| s.id == id) {
            Some(index) => {
                self.spores.swap_remove(index);
                Ok(())
            }
            None => Err(ColonyError::NotRegistered { kind: "spore", id }),
        }
    }

    fn assign_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn hyphae(&self) -> &[Hypha] {
        &self.hyphae
    }

    pub fn hyphae_mut(&mut self) -> &mut [Hypha] {
        &mut self.hyphae
    }

    pub fn spores(&self) -> &[Spore] {
        &self.spores
    }

    pub fn spores_mut(&mut self) -> &mut [Spore] {
        &mut self.spores
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn scarcities(&self) -> &[ScarcityZone] {
        &self.scarcities
    }
}
