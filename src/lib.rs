//! Card Studio: member card template tooling.
//!
//! The editor itself lives in the `canvas` crate. This crate connects it to
//! the outside world:
//!
//! | Module    | Role |
//! |-----------|------|
//! | `config`  | Template API settings from the environment |
//! | `api`     | REST client and wire types for plan card templates |
//! | `session` | One template being edited, with dirty tracking and save |
//! | `server`  | Local HTTP preview of a layout (JSON, print HTML, PNG) |

pub mod api;
pub mod config;
pub mod server;
pub mod session;
