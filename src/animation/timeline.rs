//! Per-target step sequencer.
//!
//! A [`Timeline`] walks an immutable list of [`AnimationStep`]s with a cursor.
//! The current step is resolved when it starts: deferred `from` values are
//! read from the live values the timeline mirrors for its target, so every
//! loop of a repeating sequence starts from fresh state.
//!
//! Time left over when a timed step finishes flows into the next step on the
//! same tick. Zero-duration steps and callback steps end the tick, so at most
//! one callback step fires per update.

use bitflags::bitflags;

use super::step::{AnimationStep, Callback, Tween};
use super::Animatable;
use crate::element::UiElement;

/// Upper bound on steps started in one update, for repeating sequences made
/// only of instant steps.
const MAX_STEPS_PER_UPDATE: usize = 64;

bitflags! {
    /// Properties a timeline wrote during its last update
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct PropertyFlags: u8 {
        const POSITION = 1 << 0;
        const SIZE     = 1 << 1;
        const ROTATION = 1 << 2;
        const ALPHA    = 1 << 3;
        const SCALE    = 1 << 4;
        const TEXTURE  = 1 << 5;
        const VISIBLE  = 1 << 6;
    }
}

/// Live property values of the animated target, as last written.
#[derive(Clone, Debug, PartialEq)]
pub struct Mirror {
    pub position: (f32, f32),
    pub size: (f32, f32),
    pub rotation: f32,
    pub alpha: f32,
    pub scale: f32,
    /// Last texture name set by a step, empty until then.
    pub image: String,
}

impl Default for Mirror {
    fn default() -> Self {
        Self {
            position: (0.0, 0.0),
            size: (0.0, 0.0),
            rotation: 0.0,
            alpha: 1.0,
            scale: 1.0,
            image: String::new(),
        }
    }
}

/// A step that has started, with its endpoints resolved.
enum Motion {
    Rotation(f32, f32),
    Position((f32, f32), (f32, f32)),
    Size((f32, f32), (f32, f32)),
    Alpha(f32, f32),
    Scale(f32, f32),
    Wait,
    Call(Callback),
}

struct ActiveStep {
    motion: Motion,
    duration_ms: f32,
    elapsed_ms: f32,
}

/// Ordered sequence of property changes for one target.
#[derive(Default)]
pub struct Timeline {
    sequence: Vec<AnimationStep>,
    cursor: usize,
    current: Option<ActiveStep>,
    /// 0 = play once, -1 = forever, N = N more passes after the current one.
    repeat: i32,
    mirror: Mirror,
    touched: PropertyFlags,
    texture_change: Option<String>,
    visible_override: Option<bool>,
    seeded: bool,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw step.
    pub fn step(mut self, step: AnimationStep) -> Self {
        self.sequence.push(step);
        self
    }

    // Builders

    pub fn change_texture(self, image: impl Into<String>) -> Self {
        self.step(AnimationStep::ChangeTexture(image.into()))
    }

    pub fn rotate(self, from: f32, to: f32, duration_ms: f32) -> Self {
        self.step(AnimationStep::Rotate(Tween::new(from, to, duration_ms)))
    }

    /// Rotate from the live rotation.
    pub fn rotate_to(self, to: f32, duration_ms: f32) -> Self {
        self.step(AnimationStep::Rotate(Tween::deferred(to, duration_ms)))
    }

    /// Move by a relative offset from the live position.
    pub fn move_by(self, dx: f32, dy: f32, duration_ms: f32) -> Self {
        self.step(AnimationStep::Move {
            delta: (dx, dy),
            duration_ms,
        })
    }

    pub fn move_between(self, from: (f32, f32), to: (f32, f32), duration_ms: f32) -> Self {
        self.step(AnimationStep::MoveTo(Tween::new(from, to, duration_ms)))
    }

    /// Move from the live position.
    pub fn move_to(self, x: f32, y: f32, duration_ms: f32) -> Self {
        self.step(AnimationStep::MoveTo(Tween::deferred((x, y), duration_ms)))
    }

    pub fn resize(self, from: (f32, f32), to: (f32, f32), duration_ms: f32) -> Self {
        self.step(AnimationStep::Resize(Tween::new(from, to, duration_ms)))
    }

    /// Resize from the live size.
    pub fn resize_to(self, w: f32, h: f32, duration_ms: f32) -> Self {
        self.step(AnimationStep::Resize(Tween::deferred((w, h), duration_ms)))
    }

    pub fn alpha(self, from: f32, to: f32, duration_ms: f32) -> Self {
        self.step(AnimationStep::Alpha(Tween::new(from, to, duration_ms)))
    }

    /// Fade from the live alpha.
    pub fn alpha_to(self, to: f32, duration_ms: f32) -> Self {
        self.step(AnimationStep::Alpha(Tween::deferred(to, duration_ms)))
    }

    pub fn scale(self, from: f32, to: f32, duration_ms: f32) -> Self {
        self.step(AnimationStep::Scale(Tween::new(from, to, duration_ms)))
    }

    /// Scale from the live scale.
    pub fn scale_to(self, to: f32, duration_ms: f32) -> Self {
        self.step(AnimationStep::Scale(Tween::deferred(to, duration_ms)))
    }

    pub fn delay(self, duration_ms: f32) -> Self {
        self.step(AnimationStep::Delay(duration_ms))
    }

    /// Run `f` once, on the tick this step becomes current.
    pub fn callback(self, f: impl FnMut() + 'static) -> Self {
        self.callback_for(0.0, f)
    }

    /// Run `f` on every tick for `duration_ms`.
    pub fn callback_for(self, duration_ms: f32, f: impl FnMut() + 'static) -> Self {
        let callback: Callback = std::rc::Rc::new(std::cell::RefCell::new(f));
        self.step(AnimationStep::Callback {
            callback,
            duration_ms,
        })
    }

    pub fn set_visible(self, visible: bool) -> Self {
        self.step(AnimationStep::SetVisible(visible))
    }

    /// Play the sequence `count` more times after the first pass; `-1`
    /// loops forever.
    pub fn repeat(mut self, count: i32) -> Self {
        self.repeat = count;
        self
    }

    // Live values

    /// Initialize the mirrored values from the element about to be animated.
    pub fn seed_from(&mut self, element: &UiElement) {
        self.mirror.position = (element.rect.x as f32, element.rect.y as f32);
        self.mirror.size = (element.rect.w as f32, element.rect.h as f32);
        self.mirror.rotation = element.rotation;
        self.mirror.alpha = element.alpha;
        self.mirror.scale = element.scale;
        self.seeded = true;
    }

    /// Whether [`seed_from`](Self::seed_from) has run.
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    pub fn current_position(&self) -> (f32, f32) {
        self.mirror.position
    }

    pub fn current_size(&self) -> (f32, f32) {
        self.mirror.size
    }

    pub fn current_rotation(&self) -> f32 {
        self.mirror.rotation
    }

    pub fn current_alpha(&self) -> f32 {
        self.mirror.alpha
    }

    pub fn current_scale(&self) -> f32 {
        self.mirror.scale
    }

    pub fn current_image(&self) -> &str {
        &self.mirror.image
    }

    pub fn steps(&self) -> &[AnimationStep] {
        &self.sequence
    }

    pub fn repeat_count(&self) -> i32 {
        self.repeat
    }

    // Output

    /// Properties written by the last update.
    pub fn touched(&self) -> PropertyFlags {
        self.touched
    }

    /// Texture name set since the last call, if any.
    pub fn take_texture_change(&mut self) -> Option<String> {
        self.texture_change.take()
    }

    /// Visibility set since the last call, if any.
    pub fn take_visible_override(&mut self) -> Option<bool> {
        self.visible_override.take()
    }

    // State

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_none() && self.cursor >= self.sequence.len() && self.repeat == 0
    }

    /// Advance by `dt_ms` milliseconds.
    pub fn update(&mut self, dt_ms: f32) {
        self.touched = PropertyFlags::empty();
        let mut budget = dt_ms.max(0.0);
        let mut started = 0;

        loop {
            if self.current.is_none() {
                if self.cursor >= self.sequence.len() || started >= MAX_STEPS_PER_UPDATE {
                    break;
                }
                started += 1;
                if !self.start_next() {
                    // Instant step, applied already.
                    continue;
                }
            }

            let Some(active) = self.current.as_mut() else {
                break;
            };
            active.elapsed_ms += budget;
            let duration = active.duration_ms;
            let elapsed = active.elapsed_ms;
            let is_callback = matches!(active.motion, Motion::Call(_));
            let t = if duration > 0.0 {
                (elapsed / duration).clamp(0.0, 1.0)
            } else {
                1.0
            };
            self.apply(t);

            if elapsed < duration {
                break;
            }
            self.finish_step();
            // A callback ends the tick even with time left over.
            if is_callback || duration <= 0.0 || elapsed <= duration {
                break;
            }
            budget = elapsed - duration;
        }
    }

    /// Dequeue the next step. Instant steps are applied and completed here;
    /// returns whether a timed step became current.
    fn start_next(&mut self) -> bool {
        let step = self.sequence[self.cursor].clone();
        self.cursor += 1;
        let duration_ms = step.duration_ms();

        let m = self.mirror.clone();
        let motion = match step {
            AnimationStep::ChangeTexture(image) => {
                self.mirror.image.clone_from(&image);
                self.texture_change = Some(image);
                self.touched |= PropertyFlags::TEXTURE;
                self.finish_step();
                return false;
            }
            AnimationStep::SetVisible(visible) => {
                self.visible_override = Some(visible);
                self.touched |= PropertyFlags::VISIBLE;
                self.finish_step();
                return false;
            }
            AnimationStep::Rotate(t) => Motion::Rotation(t.from.unwrap_or(m.rotation), t.to),
            AnimationStep::Move { delta, .. } => {
                let from = m.position;
                Motion::Position(from, (from.0 + delta.0, from.1 + delta.1))
            }
            AnimationStep::MoveTo(t) => Motion::Position(t.from.unwrap_or(m.position), t.to),
            AnimationStep::Resize(t) => Motion::Size(t.from.unwrap_or(m.size), t.to),
            AnimationStep::Alpha(t) => Motion::Alpha(t.from.unwrap_or(m.alpha), t.to),
            AnimationStep::Scale(t) => Motion::Scale(t.from.unwrap_or(m.scale), t.to),
            AnimationStep::Delay(_) => Motion::Wait,
            AnimationStep::Callback { callback, .. } => Motion::Call(callback),
        };

        self.current = Some(ActiveStep {
            motion,
            duration_ms,
            elapsed_ms: 0.0,
        });
        true
    }

    fn apply(&mut self, t: f32) {
        let Some(active) = self.current.as_ref() else {
            return;
        };
        match &active.motion {
            Motion::Rotation(from, to) => {
                self.mirror.rotation = f32::lerp(from, to, t);
                self.touched |= PropertyFlags::ROTATION;
            }
            Motion::Position(from, to) => {
                self.mirror.position = <(f32, f32)>::lerp(from, to, t);
                self.touched |= PropertyFlags::POSITION;
            }
            Motion::Size(from, to) => {
                self.mirror.size = <(f32, f32)>::lerp(from, to, t);
                self.touched |= PropertyFlags::SIZE;
            }
            Motion::Alpha(from, to) => {
                self.mirror.alpha = f32::lerp(from, to, t);
                self.touched |= PropertyFlags::ALPHA;
            }
            Motion::Scale(from, to) => {
                self.mirror.scale = f32::lerp(from, to, t);
                self.touched |= PropertyFlags::SCALE;
            }
            Motion::Wait => {}
            Motion::Call(callback) => match callback.try_borrow_mut() {
                Ok(mut f) => (&mut *f)(),
                Err(_) => log::warn!("Skipping re-entrant animation callback"),
            },
        }
    }

    /// Clear the current step and restart the sequence if passes remain.
    fn finish_step(&mut self) {
        self.current = None;
        if self.cursor < self.sequence.len() {
            return;
        }
        if self.repeat == -1 || self.repeat > 0 {
            if self.repeat > 0 {
                self.repeat -= 1;
            }
            self.cursor = 0;
        }
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("steps", &self.sequence.len())
            .field("cursor", &self.cursor)
            .field("running", &self.current.is_some())
            .field("repeat", &self.repeat)
            .field("mirror", &self.mirror)
            .finish()
    }
}
