//! Roll animation: easing curves and the per-fence roll state machine.

pub mod easing;
pub mod roll;

pub use roll::{HeightTransition, RollDirection, RollError, RollFrame, RollMachine, RollState};
