//! Diagnostic field views: coarse renderings of a velocity, temperature or
//! pressure field, sampled down to the field resolution before drawing.

use flow_field::{BlendMode, Canvas, Rect, Resolution, ScalarField, VectorField};

/// Arrow plot of a velocity field.
pub struct VelocityView {
    field: VectorField,
    /// Field units to cell widths.
    pub scale: f32,
}

impl VelocityView {
    pub fn new(res: Resolution) -> Self {
        VelocityView { field: VectorField::zeros(res), scale: 0.5 }
    }

    pub fn set_velocity(&mut self, src: &VectorField) { self.field.resample_from(src); }

    pub fn field(&self) -> &VectorField { &self.field }

    pub fn draw(&self, canvas: &mut Canvas, rect: Rect, blend: BlendMode) {
        canvas.draw_vector_field(&self.field, rect, self.scale, blend);
    }
}

/// Warm/cool plot of a signed scalar field.
pub struct ScalarView {
    field: ScalarField,
}

impl ScalarView {
    pub fn new(res: Resolution) -> Self {
        ScalarView { field: ScalarField::zeros(res) }
    }

    pub fn set_scalar(&mut self, src: &ScalarField) { self.field.resample_from(src); }

    pub fn field(&self) -> &ScalarField { &self.field }

    pub fn draw(&self, canvas: &mut Canvas, rect: Rect, blend: BlendMode) {
        canvas.draw_scalar_field(&self.field, rect, blend);
    }
}

/// The three views the mouse-forces diagnostic draws through.
pub struct FieldViews {
    pub velocity:    VelocityView,
    pub temperature: ScalarView,
    pub pressure:    ScalarView,
}

impl FieldViews {
    pub fn new(res: Resolution) -> Self {
        FieldViews {
            velocity:    VelocityView::new(res),
            temperature: ScalarView::new(res),
            pressure:    ScalarView::new(res),
        }
    }
}
