//! Loopcast application library.
//!
//! On-demand media transcoding plus a simulated-live HLS channel. The
//! building blocks live in the workspace crates (`loopcast-spec`,
//! `loopcast-av`, `loopcast-media`); this crate wires them into a server:
//! configuration, artifact discovery, the transcode orchestrator, startup
//! pregeneration, the virtual-live engine, and the HTTP surface.

pub mod config;
pub mod discovery;
pub mod hls;
pub mod pregen;
pub mod server;
pub mod transcode;
