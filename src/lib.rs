//! # Flyover
//!
//! Prediction core of a satellite-tracking display: parses NORAD element sets,
//! propagates them with a low-order Keplerian + J2 + linear-decay model, projects
//! the result into an observer's sky, and searches for rise/set pass events.
//!
//! The pipeline, leaves first: [`instant::Instant`] for time, [`sun::SunState`]
//! for the solar direction, [`observer::ObserverFrame`] for site geometry,
//! [`elements::OrbitalElements`] + [`propagation::propagate`] for the satellite
//! state, and [`pass::PassPredictor`] driving the whole stack to locate passes.

pub mod constants;
pub mod elements;
pub mod flyover_errors;
pub mod instant;
pub mod observer;
pub mod pass;
pub mod propagation;
pub mod sun;
