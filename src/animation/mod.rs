//! Step-sequenced property animation.
//!
//! A [`Timeline`] describes what happens to one element over time; the
//! [`Scheduler`] binds timelines to elements by name and writes their output
//! into the [`ElementStore`](crate::element::ElementStore) once per frame.

mod animatable;
mod scheduler;
pub mod spec;
mod step;
mod timeline;

pub use animatable::Animatable;
pub use scheduler::Scheduler;
pub use spec::StepSpec;
pub use step::{AnimationStep, Callback, Tween};
pub use timeline::{Mirror, PropertyFlags, Timeline};
