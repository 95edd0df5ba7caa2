//! Voice, motion and camera control fused into one desktop command
//! pipeline.
//!
//! The crate is organised around a single UI-owning tick thread plus one
//! background voice thread. The tick thread owns the camera handle and the
//! gesture debounce state; the voice thread owns the microphone. Everything
//! the background threads want the UI to see travels through the
//! [`events`] queue, which is the only cross-thread data structure here.

pub mod actions;
pub mod app;
pub mod camera;
pub mod classify;
pub mod config;
pub mod detect;
pub mod dispatch;
pub mod events;
pub mod motion;
pub mod types;
pub mod voice;

#[cfg(test)]
pub(crate) mod testutil;
