//! # Configurable Code Renderer
//!
//! One user's configurator: the option store, the synchronizer that keeps
//! the surface current, and the export entry points that read them.
//!
//! ```
//! use codegen_pro::{Action, CodeType, ConfigurableCodeRenderer, SyncOutcome};
//!
//! let mut renderer = ConfigurableCodeRenderer::new();
//! assert!(renderer.surface().image().is_some());
//!
//! let outcome = renderer.dispatch(Action::SetCodeType(CodeType::Barcode));
//! assert_eq!(outcome, SyncOutcome::Rendered);
//! assert_eq!(renderer.options().content, "1234567890");
//! ```

use chrono::NaiveDate;
use image::RgbaImage;
use rand::Rng;
use tracing::debug;

use crate::encode::{BarcodeEncoder, BarcodersEncoder, EncodeError, QrCodeEncoder, QrEncoder};
use crate::export::{self, Download, ExportError};
use crate::options::{Action, RenderOptions, reduce};
use crate::presets;
use crate::surface::Surface;
use crate::sync::{Encoders, Pending, RenderSynchronizer, SyncOutcome, Ticket};

/// Options plus everything derived from them.
pub struct ConfigurableCodeRenderer<Q = QrCodeEncoder, B = BarcodersEncoder> {
    options: RenderOptions,
    sync: RenderSynchronizer<Q, B>,
    outcome: SyncOutcome,
}

impl Default for ConfigurableCodeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurableCodeRenderer {
    /// Default options, rendered once.
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    /// Start from `options` (clamped), rendered once.
    pub fn with_options(options: RenderOptions) -> Self {
        Self::with_encoders(options, Encoders::default())
    }
}

impl<Q: QrEncoder, B: BarcodeEncoder> ConfigurableCodeRenderer<Q, B> {
    pub fn with_encoders(options: RenderOptions, encoders: Encoders<Q, B>) -> Self {
        let options = options.clamped();
        let mut sync = RenderSynchronizer::new(encoders);
        let outcome = sync.sync(&options);
        Self {
            options,
            sync,
            outcome,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn surface(&self) -> &Surface {
        self.sync.surface()
    }

    pub fn encoders(&self) -> &Encoders<Q, B> {
        self.sync.encoders()
    }

    pub fn last_error(&self) -> Option<&EncodeError> {
        self.sync.last_error()
    }

    pub fn encoder_calls(&self) -> u64 {
        self.sync.encoder_calls()
    }

    /// What the most recent synchronization did.
    pub fn last_outcome(&self) -> &SyncOutcome {
        &self.outcome
    }

    /// Apply an action and bring the surface up to date.
    pub fn dispatch(&mut self, action: Action) -> SyncOutcome {
        self.apply(action);
        let outcome = self.sync.sync(&self.options);
        debug!(outcome = outcome.label(), "Dispatched");
        self.outcome = outcome.clone();
        outcome
    }

    /// Apply an action without rendering.
    ///
    /// Pair with [`begin_render`](Self::begin_render) and
    /// [`complete_render`](Self::complete_render) when the encoder runs
    /// elsewhere.
    pub fn apply(&mut self, action: Action) {
        let options = std::mem::take(&mut self.options);
        self.options = reduce(options, action);
    }

    pub fn begin_render(&mut self) -> Pending {
        let pending = self.sync.begin(&self.options);
        if let Pending::Skipped(outcome) = &pending {
            self.outcome = outcome.clone();
        }
        pending
    }

    pub fn complete_render(
        &mut self,
        ticket: Ticket,
        result: Result<RgbaImage, EncodeError>,
    ) -> SyncOutcome {
        let outcome = self.sync.complete(ticket, result);
        // A stale result says nothing about the current options
        if outcome != SyncOutcome::Stale {
            self.outcome = outcome.clone();
        }
        outcome
    }

    /// Fill content with a random value for the current code type.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R, today: NaiveDate) -> SyncOutcome {
        let content = presets::random_content(self.options.code_type, rng, today);
        self.dispatch(Action::SetContent(content))
    }

    /// Styled PNG of the current surface.
    pub fn export_png(&self) -> Result<Download, ExportError> {
        export::export_png(&self.options, self.sync.surface())
    }

    /// SVG of the current options.
    pub fn export_svg(&self) -> Result<Download, ExportError> {
        export::export_svg(&self.options, self.sync.encoders())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{BarcodeFormat, CodeType, QR_DEFAULT_CONTENT};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_new_renders_defaults() {
        let r = ConfigurableCodeRenderer::new();
        assert_eq!(r.options(), &RenderOptions::default());
        assert!(r.surface().image().is_some());
        assert_eq!(r.encoder_calls(), 1);
        assert_eq!(r.last_outcome(), &SyncOutcome::Rendered);
    }

    #[test]
    fn test_with_options_clamps() {
        let r = ConfigurableCodeRenderer::with_options(RenderOptions {
            qr_size: 10_000,
            ..Default::default()
        });
        assert_eq!(r.options().qr_size, 500);
    }

    #[test]
    fn test_dispatch_switches_type() {
        let mut r = ConfigurableCodeRenderer::new();
        assert_eq!(r.dispatch(Action::SetCodeType(CodeType::Barcode)), SyncOutcome::Rendered);
        assert_eq!(r.options().content, "1234567890");
        assert_eq!(r.dispatch(Action::SetCodeType(CodeType::Qr)), SyncOutcome::Rendered);
        assert_eq!(r.options().content, QR_DEFAULT_CONTENT);
    }

    #[test]
    fn test_apply_defers_render() {
        let mut r = ConfigurableCodeRenderer::new();
        let revision = r.surface().revision();
        r.apply(Action::SetContent("later".into()));
        assert_eq!(r.surface().revision(), revision);

        let Pending::Ready(ticket) = r.begin_render() else {
            panic!("expected ticket");
        };
        let result = r.encoders().render(ticket.job());
        assert_eq!(r.complete_render(ticket, result), SyncOutcome::Rendered);
        assert!(r.surface().revision() > revision);
    }

    #[test]
    fn test_randomize_barcode_is_digits() {
        let mut r = ConfigurableCodeRenderer::new();
        r.dispatch(Action::SetCodeType(CodeType::Barcode));
        let mut rng = StdRng::seed_from_u64(7);
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        r.randomize(&mut rng, today);
        let content = &r.options().content;
        assert!(!content.is_empty() && content.len() <= 12);
        assert!(content.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_rejection_visible_through_last_error() {
        let mut r = ConfigurableCodeRenderer::new();
        r.dispatch(Action::SetCodeType(CodeType::Barcode));
        r.dispatch(Action::SetBarcodeFormat(BarcodeFormat::Ean13));
        assert!(r.last_error().is_some());
        assert!(matches!(r.last_outcome(), SyncOutcome::Rejected(_)));
        assert!(r.export_png().is_ok());
        assert!(r.export_svg().is_err());
    }
}
