//! Card-template editor core: scene model, interaction engine and renderers.
//!
//! This crate is compiled to WebAssembly for the browser editor and linked
//! natively by the `cardstudio` binary for preview, print and PNG export. It
//! owns the layout document model, the drag/resize/select gesture machine,
//! zoom state, and every renderer. The host JavaScript layer wires DOM events
//! to the engine and hands the resulting [`engine::Action`]s to the template
//! API.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Layout document, pages, elements and typed props |
//! | [`presets`] | Card-size presets and the default layout |
//! | [`binding`] | Data bindings and text resolution |
//! | [`media`] | Image sources and data URIs |
//! | [`camera`] | Zoom camera, points, rects and coordinate conversions |
//! | [`input`] | Input event types, UI state and the gesture state machine |
//! | [`hit`] | Hit-testing against element bodies and resize handles |
//! | [`render`] | `Scene` display list shared by every renderer |
//! | [`paint`] | Replays a `Scene` onto a browser 2D context |
//! | [`preview`] | Read-only scaled page rendering with bindings resolved |
//! | [`print`] | Standalone print HTML |
//! | [`raster`] | Software rasterization and PNG export |
//! | [`pattern`] | QR code and barcode stand-in patterns |
//! | [`host`] | Browser glue: 2D context, print window |
//! | [`consts`] | Shared numeric constants (zoom limits, minimum sizes, etc.) |

pub mod binding;
pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod host;
pub mod input;
pub mod media;
pub mod paint;
pub mod pattern;
pub mod presets;
pub mod preview;
pub mod print;
pub mod raster;
pub mod render;
