//! Renderer: draws the three linked charts and turns pointer input into
//! [`Interaction`](crate::state::Interaction)s. Holds no state of its own.

pub mod panels;
pub mod pie;
pub mod plot;
