// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Camera, viewport and tile engine for deep-zoom, 360° and rotatable-object
//! image viewers.
//!
//! Zoomview keeps the state behind an embedded image viewer: where each
//! canvas looks, how it animates between views, which image tiles the
//! current views need and in which order the canvases are drawn. It does
//! no rendering or network I/O itself; the host feeds it timestamps and
//! pointer input and consumes transforms, tile lists and draw plans.
//!
//! # Key entry points
//!
//! - [`engine::Viewer`] - owner of every canvas; layout, ticking, draw plans
//! - [`canvas::Canvas`] - one image surface: view, limits, navigation
//! - [`tiles::plan_tiles`] - visible, prefetch and fallback tile selection
//! - [`camera`] - flat, 360 and omni projection math
//! - [`options::Options`] - runtime configuration (camera, transitions,
//!   tiles)
//! - [`interop::HandleTable`] - integer-handle API for foreign hosts
//!
//! # Frame loop
//!
//! Instructions (`fly_to`, `zoom`, `pan`, ...) take effect when called and
//! return an [`animation::AnimationTicket`]. Each frame the host calls
//! [`engine::Viewer::tick`] with its clock, and when the report asks for a
//! draw, renders [`engine::Viewer::draw_plan`] with tiles from
//! [`engine::Viewer::tile_plans`] before calling
//! [`engine::Viewer::confirm_draw`].

pub mod animation;
pub mod camera;
pub mod canvas;
pub mod engine;
pub mod error;
pub mod interop;
pub mod options;
pub mod tiles;
pub mod util;
#[cfg(feature = "web")]
pub mod web;

pub use error::ViewerError;
