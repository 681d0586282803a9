//! CPU particles carried by the optical flow and the fluid velocity.
//!
//! Particles spawn at random positions, drift with the sum of the flow
//! velocity pushed this tick and the fluid velocity, and respawn when they
//! age out or enter an obstacle.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use flow_field::{BlendMode, Canvas, Rect, Resolution, Rgba, ScalarField, Vec2, VectorField};

use crate::collab::ParticleSystem;
use crate::error::{Error, Result};

/// Lifetime range, seconds.
const LIFETIME: (f32, f32) = (2.0, 6.0);

#[derive(Clone, Copy, Debug)]
struct Particle {
    /// Normalised position.
    pos:      Vec2,
    age:      f32,
    lifetime: f32,
}

pub struct CpuParticles {
    particles:      Vec<Particle>,
    flow_velocity:  VectorField,
    fluid_velocity: VectorField,
    obstacle:       ScalarField,
    speed:          f32,
    cell_size:      f32,
    active:         bool,
    rng:            StdRng,
    pub color:      Rgba,
}

impl CpuParticles {
    pub fn new(active: bool, seed: u64) -> Self {
        let one = Resolution::new(1, 1);
        CpuParticles {
            particles:      Vec::new(),
            flow_velocity:  VectorField::zeros(one),
            fluid_velocity: VectorField::zeros(one),
            obstacle:       ScalarField::zeros(one),
            speed:          1.0,
            cell_size:      1.0,
            active,
            rng:            StdRng::seed_from_u64(seed),
            color:          Rgba::new(0.9, 0.95, 1.0, 0.6),
        }
    }

    pub fn set_active(&mut self, active: bool) { self.active = active; }

    pub fn len(&self) -> usize { self.particles.len() }

    pub fn is_empty(&self) -> bool { self.particles.is_empty() }

    /// Positions, normalised.
    pub fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.particles.iter().map(|p| p.pos)
    }

    fn spawn(rng: &mut StdRng) -> Particle {
        Particle {
            pos:      Vec2::new(rng.gen::<f32>(), rng.gen::<f32>()),
            age:      0.0,
            lifetime: rng.gen_range(LIFETIME.0..LIFETIME.1),
        }
    }
}

impl ParticleSystem for CpuParticles {
    fn setup(&mut self, flow: Resolution, draw: Resolution, reduced_precision: bool) -> Result<()> {
        if flow.is_empty() || draw.is_empty() {
            return Err(Error::Setup {
                stage:  "particles",
                reason: format!("empty resolution (flow {flow}, draw {draw})"),
            });
        }
        let count = if reduced_precision { flow.len() / 4 } else { flow.len() };
        self.flow_velocity  = VectorField::zeros(flow);
        self.fluid_velocity = VectorField::zeros(flow);
        self.obstacle       = ScalarField::zeros(flow);
        let rng = &mut self.rng;
        self.particles = (0..count.max(1))
            .map(|_| {
                let mut p = Self::spawn(rng);
                p.age = rng.gen_range(0.0..p.lifetime);
                p
            })
            .collect();
        log::debug!("particles: {} at {flow}", self.particles.len());
        Ok(())
    }

    fn is_active(&self) -> bool { self.active }

    fn set_speed(&mut self, speed: f32) { self.speed = speed; }

    fn set_cell_size(&mut self, size: f32) { self.cell_size = size; }

    fn add_flow_velocity(&mut self, field: &VectorField, strength: f32) {
        self.flow_velocity.add_scaled(field, strength);
    }

    fn add_fluid_velocity(&mut self, field: &VectorField) {
        self.fluid_velocity.resample_from(field);
    }

    fn set_obstacle(&mut self, field: &ScalarField) {
        self.obstacle.resample_from(field);
    }

    fn update(&mut self, dt: f32) {
        if self.active {
            let step = dt * self.speed * self.cell_size;
            for p in &mut self.particles {
                let v = self.flow_velocity.sample_bilinear(p.pos.x, p.pos.y)
                      + self.fluid_velocity.sample_bilinear(p.pos.x, p.pos.y);
                p.pos += v * step;
                p.age += dt;

                let outside = !(0.0..=1.0).contains(&p.pos.x) || !(0.0..=1.0).contains(&p.pos.y);
                let blocked = !outside && self.obstacle.sample(p.pos.x, p.pos.y) > 0.5;
                if outside || blocked || p.age >= p.lifetime {
                    *p = Self::spawn(&mut self.rng);
                }
            }
        }
        self.flow_velocity.clear();
    }

    fn draw(&self, canvas: &mut Canvas, rect: Rect, blend: BlendMode) {
        for p in &self.particles {
            let fade = 1.0 - (p.age / p.lifetime).clamp(0.0, 1.0);
            let x = rect.x + (p.pos.x * rect.w as f32) as i32;
            let y = rect.y + (p.pos.y * rect.h as f32) as i32;
            canvas.blend_pixel(x, y, self.color.scale(fade), blend);
        }
    }
}
