//! # Codegen Pro - QR Code and Barcode Configurator
//!
//! Codegen Pro collects content and styling options for a QR code or a
//! linear barcode, keeps a rendered preview in step with them, and exports
//! the result as PNG or SVG. It provides:
//!
//! - **Options**: a flat [`RenderOptions`] record changed only through the
//!   pure [`reduce`] function
//! - **Synchronization**: re-renders only when something the encoder draws
//!   has changed, and only the newest request reaches the surface
//! - **Encoders**: QR via `qrcode`, linear symbologies via `barcoders`
//! - **Export**: styled PNG at 2x, plain SVG, filenames derived from content
//! - **Server**: a browser configurator over HTTP
//!
//! ## Quick Start
//!
//! ```no_run
//! use codegen_pro::{
//!     Action, BarcodeFormat, CodeType, ConfigurableCodeRenderer,
//!     export::{DirectorySaver, FileSaver},
//! };
//!
//! let mut renderer = ConfigurableCodeRenderer::new();
//! renderer.dispatch(Action::SetCodeType(CodeType::Barcode));
//! renderer.dispatch(Action::SetBarcodeFormat(BarcodeFormat::Ean13));
//! renderer.dispatch(Action::SetContent("590123412345".into()));
//!
//! let saver = DirectorySaver::new("out");
//! saver.save(&renderer.export_png()?)?;
//! saver.save(&renderer.export_svg()?)?;
//!
//! # Ok::<(), codegen_pro::error::CodegenError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`options`] | Option record, actions and reducer |
//! | [`sync`] | Render key and ticketed synchronization |
//! | [`encode`] | QR and barcode encoder collaborators |
//! | [`export`] | PNG/SVG export and file saving |
//! | [`session`] | Options, surface and export in one place |
//! | [`presets`] | QR presets and random content |
//! | [`server`] | HTTP server for the browser UI |
//! | [`error`] | Error types |

pub mod color;
pub mod config;
pub mod encode;
pub mod error;
pub mod export;
pub mod options;
pub mod presets;
pub mod server;
pub mod session;
pub mod surface;
pub mod sync;

// Re-exports for convenience
pub use color::Color;
pub use error::CodegenError;
pub use options::{
    Action, BackgroundType, BarcodeFormat, CodeType, Pattern, QrErrorLevel, RenderOptions, reduce,
};
pub use session::ConfigurableCodeRenderer;
pub use surface::Surface;
pub use sync::{RenderSynchronizer, SyncOutcome};
