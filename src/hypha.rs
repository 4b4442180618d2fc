use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::breed::BreedTable;
use crate::error::{probability, ColonyError};
use crate::raster;
use crate::types::{Bounds, Color};

/// Growth parameters shared by every hypha of a colony.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct HyphaParams {
    /// Extension coefficient right after germination; upper bound for the
    /// breed's rate function.
    pub initial_tip_extension_rate: f32,
    /// Steady-state extension coefficient; lower bound for the breed's rate
    /// function.
    pub max_extension_rate: f32,
    pub branching_probability: f32,
    pub death_probability: f32,
    /// Step-size scale applied to the extension coefficient.
    pub unit_radius: f32,
    /// Reserved time-coupling constant; stored, not yet consulted.
    pub k_t: f32,
    /// Reserved scarcity-coupling constant; stored, not yet consulted.
    pub k_s: f32,
}

impl Default for HyphaParams {
    fn default() -> Self {
        Self {
            initial_tip_extension_rate: 80.0,
            max_extension_rate: 5.0,
            branching_probability: 0.025,
            death_probability: 0.0005,
            unit_radius: 1.0,
            k_t: 5.0,
            k_s: 200.0,
        }
    }
}

impl HyphaParams {
    pub fn validate(&self) -> Result<(), ColonyError> {
        probability("branching_probability", self.branching_probability)?;
        probability("death_probability", self.death_probability)?;
        Ok(())
    }
}

/// A single growing filament: fixed origin and direction, a moving tip
/// clamped to the simulation area, and the trace of every grid point the
/// tip has passed through ("drain points").
#[derive(Clone, Debug)]
pub struct Hypha {
    /// Registry-assigned id; 0 until the hypha is added to the colony.
    pub id: u64,
    pub origin_x: f32,
    pub origin_y: f32,
    pub tip_x: f32,
    pub tip_y: f32,
    /// Growth direction in radians; fixed for the hypha's whole life.
    pub angle: f32,
    pub breed_id: usize,
    pub color: Color,
    pub params: HyphaParams,
    pub alive: bool,
    pub reproduce: bool,
    pub drain_points: Vec<(i32, i32)>,
}

impl Hypha {
    /// New hypha growing in a fresh random direction, uniform in [0, 2pi).
    pub fn new<R: Rng>(
        origin_x: f32,
        origin_y: f32,
        breed_id: usize,
        params: &HyphaParams,
        breeds: &BreedTable,
        rng: &mut R,
    ) -> Result<Self, ColonyError> {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        Self::with_angle(origin_x, origin_y, angle, breed_id, params, breeds)
    }

    /// New hypha with an explicit growth direction. The tip starts at the
    /// origin, so the drain trace begins with the origin point.
    pub fn with_angle(
        origin_x: f32,
        origin_y: f32,
        angle: f32,
        breed_id: usize,
        params: &HyphaParams,
        breeds: &BreedTable,
    ) -> Result<Self, ColonyError> {
        params.validate()?;
        let color = breeds.profile(breed_id)?.color;
        Ok(Self {
            id: 0,
            origin_x,
            origin_y,
            tip_x: origin_x,
            tip_y: origin_y,
            angle,
            breed_id,
            color,
            params: *params,
            alive: true,
            reproduce: false,
            drain_points: raster::points_on_line((origin_x, origin_y), (origin_x, origin_y)),
        })
    }

    /// True while the tip keeps more than one unit of clearance from every
    /// edge. A tip that has been clamped onto the margin is out of bounds
    /// and dies unconditionally on its next update.
    pub fn in_bounds(&self, bounds: Bounds) -> bool {
        bounds.interior(self.tip_x, self.tip_y)
    }

    /// Euclidean distance from the origin to the current tip.
    pub fn branch_length(&self) -> f32 {
        let dx = self.tip_x - self.origin_x;
        let dy = self.tip_y - self.origin_y;
        (dx * dx + dy * dy).sqrt()
    }

    /// One growth tick: death check, branch check, then tip advancement.
    /// Death wins over branching. Both draws happen every tick so the draw
    /// sequence stays stable for a given seed.
    pub fn update<R: Rng>(&mut self, rng: &mut R, extension_coefficient: f32, bounds: Bounds) {
        let in_bounds = self.in_bounds(bounds);
        if rng.gen::<f32>() < self.params.death_probability || !in_bounds {
            self.alive = false;
        }
        if rng.gen::<f32>() < self.params.branching_probability && self.alive && in_bounds {
            self.reproduce = true;
        }
        if self.alive {
            self.grow(extension_coefficient, bounds);
        }
    }

    /// Advance the tip along the fixed direction, clamp it into the
    /// simulation area, and append the traversed segment to the drain trace.
    fn grow(&mut self, extension_coefficient: f32, bounds: Bounds) {
        let old_tip = (self.tip_x, self.tip_y);
        let step = self.params.unit_radius * extension_coefficient;
        self.tip_x += step * self.angle.cos();
        self.tip_y += step * self.angle.sin();
        let (x, y) = bounds.clamp(self.tip_x, self.tip_y);
        self.tip_x = x;
        self.tip_y = y;
        self.drain_points
            .extend(raster::points_on_line(old_tip, (self.tip_x, self.tip_y)));
    }

    /// Consume the branch signal.
    pub fn take_reproduce(&mut self) -> bool {
        std::mem::take(&mut self.reproduce)
    }
}
