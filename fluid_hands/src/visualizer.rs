//! Software-rendered window using `minifb`.
//!
//! The window owns no orchestration state.  Each frame it turns raw input
//! into messages for the collaborators that consume them:
//!
//! | Input | Goes to |
//! |---|---|
//! | left / right drag | pointer forces ([`PointerEvent`]) |
//! | hold `H` / `J` | simulated hand 1 / 2 at the pointer ([`SimHandInput`]) |
//! | `M` | [`Command::ToggleRenderMode`] |
//! | `R` | [`Command::Reset`] |
//! | `Esc` / `Q` / close | [`Command::Quit`] |

use std::sync::mpsc::Sender;
use std::time::Duration;

use flow_field::{Canvas, Resolution, Rgba, Vec2};
use hand_tracker::SimHandInput;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use pointer_forces::{PointerButton, PointerEvent};

use crate::error::{Error, Result};

const LEGEND:       &str = "drag: forces  hold h/j: hands  m: mode  r: reset  q: quit";
const LEGEND_COLOR: Rgba = Rgba::new(0.55, 0.55, 0.55, 1.0);
const STATUS_COLOR: Rgba = Rgba::new(0.93, 0.93, 0.93, 1.0);

/// Window-level requests for the run loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    ToggleRenderMode,
    Reset,
    Quit,
}

/// Which buttons were down on the previous poll, and where.
#[derive(Default)]
struct PointerState {
    primary:   bool,
    secondary: bool,
    last:      Option<Vec2>,
}

pub struct Visualizer {
    window:     Window,
    res:        Resolution,
    pointer_tx: Sender<PointerEvent>,
    sim_tx:     Sender<SimHandInput>,
    pointer:    PointerState,
    held_hands: [bool; 2],
}

impl Visualizer {
    pub fn new(
        res:        Resolution,
        target_fps: u32,
        pointer_tx: Sender<PointerEvent>,
        sim_tx:     Sender<SimHandInput>,
    ) -> Result<Self> {
        let mut window = Window::new(
            "fluid hands",
            res.width, res.height,
            WindowOptions { resize: false, ..WindowOptions::default() },
        ).map_err(|e| Error::Window(e.to_string()))?;

        window.limit_update_rate(Some(Duration::from_secs_f64(1.0 / target_fps.max(1) as f64)));

        Ok(Visualizer {
            window,
            res,
            pointer_tx,
            sim_tx,
            pointer:    PointerState::default(),
            held_hands: [false; 2],
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Route this frame's input; returns the commands for the run loop.
    pub fn poll_input(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        if !self.window.is_open() {
            commands.push(Command::Quit);
            return commands;
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        if one_shot(Key::Escape) || one_shot(Key::Q) { commands.push(Command::Quit); }
        if one_shot(Key::M) { commands.push(Command::ToggleRenderMode); }
        if one_shot(Key::R) { commands.push(Command::Reset); }

        let mouse = self.window.get_mouse_pos(MouseMode::Discard);
        self.route_pointer(mouse);
        self.route_hands(mouse);

        commands
    }

    fn route_pointer(&mut self, mouse: Option<(f32, f32)>) {
        let norm = mouse.map(|(x, y)| {
            Vec2::new(x / self.res.width.max(1) as f32, y / self.res.height.max(1) as f32)
        });
        let buttons = [
            (PointerButton::Primary,   self.window.get_mouse_down(MouseButton::Left),  self.pointer.primary),
            (PointerButton::Secondary, self.window.get_mouse_down(MouseButton::Right), self.pointer.secondary),
        ];
        for (button, down, was_down) in buttons {
            let event = match (down, was_down, norm) {
                (true, false, Some(position)) => Some(PointerEvent::Down { button, position }),
                (true, true, Some(position)) if Some(position) != self.pointer.last =>
                    Some(PointerEvent::Drag { button, position }),
                (false, true, _) => Some(PointerEvent::Up { button }),
                _ => None,
            };
            if let Some(event) = event {
                let _ = self.pointer_tx.send(event);
            }
        }
        self.pointer.primary   = buttons[0].1;
        self.pointer.secondary = buttons[1].1;
        self.pointer.last      = norm;
    }

    fn route_hands(&mut self, mouse: Option<(f32, f32)>) {
        for (slot, key) in [(0u8, Key::H), (1u8, Key::J)] {
            let down = self.window.is_key_down(key);
            let was = &mut self.held_hands[slot as usize];
            match (down, mouse) {
                (true, Some((x, y))) => {
                    let _ = self.sim_tx.send(SimHandInput::Place { slot, position: Vec2::new(x, y) });
                    *was = true;
                }
                (false, _) if *was => {
                    let _ = self.sim_tx.send(SimHandInput::Release { slot });
                    *was = false;
                }
                _ => {}
            }
        }
    }

    /// Stamp the status line and key legend, then push the canvas.
    pub fn present(&mut self, canvas: &mut Canvas, status: &str) -> Result<()> {
        let h = canvas.resolution().height as i32;
        canvas.draw_text(status, 8, 8, STATUS_COLOR);
        canvas.draw_text(LEGEND, 8, h - 12, LEGEND_COLOR);
        let res = canvas.resolution();
        self.window
            .update_with_buffer(canvas.pixels(), res.width, res.height)
            .map_err(|e| Error::Window(e.to_string()))
    }
}
