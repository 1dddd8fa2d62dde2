//! Request middleware.
//!
//! Purpose: lifecycle concerns that wrap every request, currently trace
//! identifier assignment.

pub mod trace;

pub use trace::Trace;
