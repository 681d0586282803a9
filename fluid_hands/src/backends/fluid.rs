//! Forcing-only fluid.
//!
//! Accumulates every forcing term it is given, blocks flow inside this
//! tick's obstacles and dissipates each field exponentially.  There is no
//! advection, diffusion or pressure projection; divergence is reported from
//! central differences of the velocity.

use flow_field::{
    BlendMode, Canvas, ColorField, Rect, Resolution, Rgba, ScalarField, Vec2, VectorField,
};

use crate::collab::FluidSimulation;
use crate::error::{Error, Result};

/// Tunables, in "fraction kept per second".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluidParams {
    pub speed:                 f32,
    pub cell_size:             f32,
    pub velocity_retention:    f32,
    pub density_retention:     f32,
    pub temperature_retention: f32,
    pub pressure_retention:    f32,
}

impl Default for FluidParams {
    fn default() -> Self {
        FluidParams {
            speed:                 0.3,
            cell_size:             1.25,
            velocity_retention:    0.2,
            density_retention:     0.3,
            temperature_retention: 0.3,
            pressure_retention:    0.1,
        }
    }
}

pub struct ForcingFluid {
    pub params:    FluidParams,
    velocity:      VectorField,
    pressure:      ScalarField,
    temperature:   ScalarField,
    divergence:    ScalarField,
    obstacle:      ScalarField,
    temp_obstacle: ScalarField,
    density:       ColorField,
}

impl ForcingFluid {
    pub fn new(params: FluidParams) -> Self {
        let one = Resolution::new(1, 1);
        ForcingFluid {
            params,
            velocity:      VectorField::zeros(one),
            pressure:      ScalarField::zeros(one),
            temperature:   ScalarField::zeros(one),
            divergence:    ScalarField::zeros(one),
            obstacle:      ScalarField::zeros(one),
            temp_obstacle: ScalarField::zeros(one),
            density:       ColorField::zeros(one),
        }
    }

    fn retention(keep_per_second: f32, dt: f32) -> f32 {
        keep_per_second.clamp(0.0, 1.0).powf(dt)
    }

    fn compute_divergence(&mut self) {
        let res = self.velocity.resolution();
        let inv = 0.5 / self.params.cell_size.max(f32::EPSILON);
        for y in 0..res.height {
            for x in 0..res.width {
                let l = self.velocity.get(x.saturating_sub(1), y).x;
                let r = self.velocity.get(x + 1, y).x;
                let t = self.velocity.get(x, y.saturating_sub(1)).y;
                let b = self.velocity.get(x, y + 1).y;
                self.divergence.set(x, y, (r - l + b - t) * inv);
            }
        }
    }
}

impl Default for ForcingFluid {
    fn default() -> Self { ForcingFluid::new(FluidParams::default()) }
}

impl FluidSimulation for ForcingFluid {
    fn setup(&mut self, flow: Resolution, draw: Resolution, reduced_precision: bool) -> Result<()> {
        if flow.is_empty() || draw.is_empty() {
            return Err(Error::Setup {
                stage:  "fluid",
                reason: format!("empty resolution (flow {flow}, draw {draw})"),
            });
        }
        let density_res = if reduced_precision { flow } else { draw };
        self.velocity      = VectorField::zeros(flow);
        self.pressure      = ScalarField::zeros(flow);
        self.temperature   = ScalarField::zeros(flow);
        self.divergence    = ScalarField::zeros(flow);
        self.obstacle      = ScalarField::zeros(flow);
        self.temp_obstacle = ScalarField::zeros(flow);
        self.density       = ColorField::zeros(density_res);
        log::debug!("fluid: velocity {flow}, density {density_res}");
        Ok(())
    }

    fn add_velocity(&mut self, field: &VectorField, strength: f32) {
        self.velocity.add_scaled(field, strength);
    }

    fn add_density(&mut self, field: &ColorField, strength: f32) {
        self.density.add_scaled(field, strength);
    }

    fn add_temperature(&mut self, field: &ScalarField, strength: f32) {
        self.temperature.add_scaled(field, strength);
    }

    fn add_pressure(&mut self, field: &ScalarField, strength: f32) {
        self.pressure.add_scaled(field, strength);
    }

    fn add_temp_obstacle(&mut self, field: &ScalarField) {
        self.temp_obstacle.add_scaled(field, 1.0);
    }

    fn update(&mut self, dt: f32) {
        let t = dt * self.params.speed;

        // This tick's obstacles replace the last tick's.
        self.obstacle.resample_from(&self.temp_obstacle);
        self.temp_obstacle.clear();

        self.velocity.scale_in_place(Self::retention(self.params.velocity_retention, t));
        self.density.scale_in_place(Self::retention(self.params.density_retention, t));
        self.temperature.scale_in_place(Self::retention(self.params.temperature_retention, t));
        self.pressure.scale_in_place(Self::retention(self.params.pressure_retention, t));

        for (v, &o) in self.velocity.data_mut().iter_mut().zip(self.obstacle.data()) {
            if o > 0.5 { *v = Vec2::default(); }
        }
        let dres = self.density.resolution();
        let (w, h) = (dres.width as f32, dres.height as f32);
        for y in 0..dres.height {
            for x in 0..dres.width {
                let o = self.obstacle.sample((x as f32 + 0.5) / w, (y as f32 + 0.5) / h);
                if o > 0.5 { self.density.set(x, y, Rgba::default()); }
            }
        }

        self.compute_divergence();
    }

    fn draw(&self, canvas: &mut Canvas, rect: Rect, blend: BlendMode) {
        canvas.draw_color_field(&self.density, rect, blend);
    }

    fn velocity(&self)    -> &VectorField { &self.velocity }
    fn pressure(&self)    -> &ScalarField { &self.pressure }
    fn temperature(&self) -> &ScalarField { &self.temperature }
    fn divergence(&self)  -> &ScalarField { &self.divergence }
    fn obstacle(&self)    -> &ScalarField { &self.obstacle }
    fn density(&self)     -> &ColorField  { &self.density }

    fn speed(&self) -> f32 { self.params.speed }

    fn cell_size(&self) -> f32 { self.params.cell_size }

    fn reset(&mut self) {
        self.velocity.clear();
        self.pressure.clear();
        self.temperature.clear();
        self.divergence.clear();
        self.obstacle.clear();
        self.temp_obstacle.clear();
        self.density.clear();
    }
}
