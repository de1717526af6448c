//! Showtime capture for the Cinéma Magic (Le Creusot) website.
//!
//! The showtimes page is rendered client-side, so a capture drives a headless
//! browser to the page, waits for the film cards to appear, and extracts one
//! record per film from the rendered markup. The result is written as a JSON
//! document that a static site can consume.

pub mod capture;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extraction;
pub mod model;
pub mod renderer;
pub mod store;
