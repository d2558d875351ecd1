//! Timeline steps.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::Animatable;

/// Closure run by a callback step. Shared so sequences can be restarted.
pub type Callback = Rc<RefCell<dyn FnMut()>>;

/// Interpolation between two values over a duration.
///
/// A `from` of `None` is deferred: it is read from the timeline's live
/// values when the step becomes current.
#[derive(Clone, Debug, PartialEq)]
pub struct Tween<T> {
    pub from: Option<T>,
    pub to: T,
    pub duration_ms: f32,
}

impl<T: Animatable> Tween<T> {
    pub fn new(from: T, to: T, duration_ms: f32) -> Self {
        Self {
            from: Some(from),
            to,
            duration_ms,
        }
    }

    pub fn deferred(to: T, duration_ms: f32) -> Self {
        Self {
            from: None,
            to,
            duration_ms,
        }
    }

    pub fn is_deferred(&self) -> bool {
        self.from.is_none()
    }
}

/// One entry of a timeline.
#[derive(Clone)]
pub enum AnimationStep {
    /// Swap the target's texture by cache name. Takes no time.
    ChangeTexture(String),
    Rotate(Tween<f32>),
    /// Shift by a delta relative to the position when the step starts.
    Move { delta: (f32, f32), duration_ms: f32 },
    MoveTo(Tween<(f32, f32)>),
    Resize(Tween<(f32, f32)>),
    Alpha(Tween<f32>),
    Scale(Tween<f32>),
    Delay(f32),
    /// Invoke `callback` once per update while the step is current.
    Callback {
        callback: Callback,
        duration_ms: f32,
    },
    /// Override the target's visibility. Takes no time.
    SetVisible(bool),
}

impl AnimationStep {
    pub fn duration_ms(&self) -> f32 {
        match self {
            Self::ChangeTexture(_) | Self::SetVisible(_) => 0.0,
            Self::Rotate(t) | Self::Alpha(t) | Self::Scale(t) => t.duration_ms,
            Self::MoveTo(t) | Self::Resize(t) => t.duration_ms,
            Self::Move { duration_ms, .. } | Self::Callback { duration_ms, .. } => *duration_ms,
            Self::Delay(ms) => *ms,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::ChangeTexture(_) => "changeTexture",
            Self::Rotate(_) => "rotate",
            Self::Move { .. } => "move",
            Self::MoveTo(_) => "moveTo",
            Self::Resize(_) => "resize",
            Self::Alpha(_) => "alpha",
            Self::Scale(_) => "scale",
            Self::Delay(_) => "delay",
            Self::Callback { .. } => "callback",
            Self::SetVisible(_) => "setVisible",
        }
    }
}

impl fmt::Debug for AnimationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChangeTexture(image) => f.debug_tuple("ChangeTexture").field(image).finish(),
            Self::Rotate(t) => f.debug_tuple("Rotate").field(t).finish(),
            Self::Move { delta, duration_ms } => f
                .debug_struct("Move")
                .field("delta", delta)
                .field("duration_ms", duration_ms)
                .finish(),
            Self::MoveTo(t) => f.debug_tuple("MoveTo").field(t).finish(),
            Self::Resize(t) => f.debug_tuple("Resize").field(t).finish(),
            Self::Alpha(t) => f.debug_tuple("Alpha").field(t).finish(),
            Self::Scale(t) => f.debug_tuple("Scale").field(t).finish(),
            Self::Delay(ms) => f.debug_tuple("Delay").field(ms).finish(),
            Self::Callback { duration_ms, .. } => f
                .debug_struct("Callback")
                .field("duration_ms", duration_ms)
                .finish_non_exhaustive(),
            Self::SetVisible(v) => f.debug_tuple("SetVisible").field(v).finish(),
        }
    }
}
