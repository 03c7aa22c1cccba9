#![doc(html_root_url = "https://docs.rs/tryit-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Sandboxed multi-example live preview.
//!
//! A [`TryItPanel`](`web::TryItPanel`) shows an ordered [`ExampleSet`](`example::ExampleSet`) as tabs and renders exactly one example at a time
//! in a sandboxed iframe. Switching tabs (or re-selecting the active one) tears the old surface down before the next one is created,
//! and load notifications from superseded surfaces are discarded by [`Generation`](`generation::Generation`).
//!
//! Everything except [`web`] is platform-agnostic: [`panel::Panel`] drives any [`surface::SurfacePlatform`].

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod example;
pub mod generation;
pub mod host;
pub mod isolation;
pub mod panel;
pub mod surface;
pub mod tabs;
pub mod web;
