//! Ball flight: spin lift, impulse serves and per-step orchestration.

mod aerodynamics;
mod serve;
mod flight;

pub use self::aerodynamics::{compute_magnus_force, magnus_coefficient};
pub use self::serve::{ServeController, ServeImpulse};
pub use self::flight::{BallFlightController, FlightState};
