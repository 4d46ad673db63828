//! Client for a remote portfolio optimization service.
//!
//! The form collects a capacity and candidate projects, validation gates what
//! may be sent, the dispatcher talks to the service and the renderer turns the
//! answer into tables and chart series. [`session::Session`] ties them together.

pub mod config;
pub mod dispatch;
pub mod form;
pub mod model;
pub mod output;
pub mod render;
pub mod session;
pub mod shell;
