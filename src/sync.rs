//! # Render Synchronizer
//!
//! Keeps the drawable [`Surface`] in step with [`RenderOptions`].
//!
//! Options are first mapped to a [`RenderJob`], the exact request an encoder
//! will see. The job doubles as the render key: if it equals the last
//! requested job, nothing the encoder would draw has changed and no call is
//! made. Styling that only the container paints (gradient, pattern, border
//! radius, shadow) never reaches a job, so editing it never re-renders.
//!
//! ## Ordering
//!
//! Every render is issued a [`Ticket`] with an increasing generation. A result
//! is committed only if its ticket is still the newest one, so when encoders
//! run off-thread the surface always ends on the latest request
//! (last-write-wins). Synchronous callers use [`RenderSynchronizer::sync`],
//! which does begin, encode and complete in one step.

use image::RgbaImage;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::encode::{
    BarcodeEncoder, BarcodeRequest, BarcodersEncoder, EncodeError, QrCodeEncoder, QrEncoder,
    QrRequest, TextAlign, TextPosition,
};
use crate::options::{CodeType, RenderOptions};
use crate::surface::Surface;

/// Gap between bars and text, fixed by the form.
pub const BARCODE_TEXT_MARGIN: u32 = 2;

/// UI margin units per QR quiet-zone module.
pub const QR_MARGIN_DIVISOR: f32 = 10.0;

/// One encoder invocation, fully mapped from options.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderJob {
    Qr(QrRequest),
    Barcode(BarcodeRequest),
}

impl RenderJob {
    /// Job for the on-screen surface, or `None` when content is empty.
    pub fn for_surface(options: &RenderOptions) -> Option<Self> {
        if options.content.is_empty() {
            return None;
        }
        Some(Self::build(options, options.encoder_background()))
    }

    /// Job for vector export.
    ///
    /// Unlike the surface, vector output always uses `background_color`:
    /// the container styling is not part of the exported symbol.
    pub fn for_vector(options: &RenderOptions) -> Self {
        Self::build(options, options.background_color)
    }

    fn build(options: &RenderOptions, background: crate::color::Color) -> Self {
        match options.code_type {
            CodeType::Qr => RenderJob::Qr(QrRequest {
                data: options.content.clone(),
                size: options.qr_size,
                margin: options.margin as f32 / QR_MARGIN_DIVISOR,
                dark: options.line_color,
                light: background,
                error_level: options.qr_error_level,
            }),
            CodeType::Barcode => RenderJob::Barcode(BarcodeRequest {
                data: options.content.clone(),
                format: options.barcode_format,
                module_width: options.width,
                bar_height: options.height,
                show_text: options.display_value,
                font_size: options.font_size,
                text_align: TextAlign::Center,
                text_position: TextPosition::Bottom,
                text_margin: BARCODE_TEXT_MARGIN,
                background,
                foreground: options.line_color,
                margin: options.margin,
            }),
        }
    }
}

/// The pair of encoder collaborators, cheap to clone into worker threads.
pub struct Encoders<Q = QrCodeEncoder, B = BarcodersEncoder> {
    pub qr: Arc<Q>,
    pub barcode: Arc<B>,
}

impl<Q, B> Clone for Encoders<Q, B> {
    fn clone(&self) -> Self {
        Self {
            qr: Arc::clone(&self.qr),
            barcode: Arc::clone(&self.barcode),
        }
    }
}

impl Default for Encoders {
    fn default() -> Self {
        Self::new(QrCodeEncoder, BarcodersEncoder)
    }
}

impl<Q: QrEncoder, B: BarcodeEncoder> Encoders<Q, B> {
    pub fn new(qr: Q, barcode: B) -> Self {
        Self {
            qr: Arc::new(qr),
            barcode: Arc::new(barcode),
        }
    }

    /// Rasterize a job.
    pub fn render(&self, job: &RenderJob) -> Result<RgbaImage, EncodeError> {
        match job {
            RenderJob::Qr(req) => self.qr.render(req),
            RenderJob::Barcode(req) => self.barcode.render(req),
        }
    }

    /// Produce the SVG document for a job.
    pub fn to_svg(&self, job: &RenderJob) -> Result<String, EncodeError> {
        match job {
            RenderJob::Qr(req) => self.qr.to_svg(req),
            RenderJob::Barcode(req) => self.barcode.to_svg(req),
        }
    }
}

/// What a synchronization did.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// A new render was committed to the surface.
    Rendered,
    /// The render key did not change; no encoder call was made.
    Unchanged,
    /// Content is empty; the surface was left alone.
    Empty,
    /// The encoder rejected the content; the surface keeps its last render.
    Rejected(EncodeError),
    /// A newer render was requested while this one was in flight.
    Stale,
}

impl SyncOutcome {
    /// Short machine-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            SyncOutcome::Rendered => "rendered",
            SyncOutcome::Unchanged => "unchanged",
            SyncOutcome::Empty => "empty",
            SyncOutcome::Rejected(_) => "rejected",
            SyncOutcome::Stale => "stale",
        }
    }
}

/// Result of planning a render.
#[derive(Debug)]
pub enum Pending {
    /// Encode this ticket's job and hand the result to `complete`.
    Ready(Ticket),
    /// Nothing to do.
    Skipped(SyncOutcome),
}

/// A requested render awaiting its encoder result.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    generation: u64,
    job: RenderJob,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn job(&self) -> &RenderJob {
        &self.job
    }
}

/// Owns the surface and decides when to re-run the encoders.
pub struct RenderSynchronizer<Q = QrCodeEncoder, B = BarcodersEncoder> {
    encoders: Encoders<Q, B>,
    surface: Surface,
    /// Key of the most recent request (successful or not).
    requested: Option<RenderJob>,
    /// Newest ticket issued.
    generation: u64,
    last_error: Option<EncodeError>,
    encoder_calls: u64,
}

impl Default for RenderSynchronizer {
    fn default() -> Self {
        Self::new(Encoders::default())
    }
}

impl<Q: QrEncoder, B: BarcodeEncoder> RenderSynchronizer<Q, B> {
    pub fn new(encoders: Encoders<Q, B>) -> Self {
        Self {
            encoders,
            surface: Surface::new(),
            requested: None,
            generation: 0,
            last_error: None,
            encoder_calls: 0,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn encoders(&self) -> &Encoders<Q, B> {
        &self.encoders
    }

    /// The rejection from the most recent render, cleared by the next success.
    pub fn last_error(&self) -> Option<&EncodeError> {
        self.last_error.as_ref()
    }

    /// Number of encoder invocations made through `sync`/`begin`.
    pub fn encoder_calls(&self) -> u64 {
        self.encoder_calls
    }

    /// Forget the last render key so the next sync re-renders.
    pub fn invalidate(&mut self) {
        self.requested = None;
    }

    /// Render now if anything visual changed.
    pub fn sync(&mut self, options: &RenderOptions) -> SyncOutcome {
        match self.begin(options) {
            Pending::Skipped(outcome) => outcome,
            Pending::Ready(ticket) => {
                let result = self.encoders.render(&ticket.job);
                self.complete(ticket, result)
            }
        }
    }

    /// Plan a render and issue a ticket for it.
    ///
    /// The caller runs the encoder (possibly on another thread, via a clone of
    /// [`encoders`](Self::encoders)) and passes the result to
    /// [`complete`](Self::complete).
    pub fn begin(&mut self, options: &RenderOptions) -> Pending {
        let Some(job) = RenderJob::for_surface(options) else {
            return Pending::Skipped(SyncOutcome::Empty);
        };
        if self.requested.as_ref() == Some(&job) {
            return Pending::Skipped(SyncOutcome::Unchanged);
        }

        self.generation += 1;
        self.encoder_calls += 1;
        self.requested = Some(job.clone());
        Pending::Ready(Ticket {
            generation: self.generation,
            job,
        })
    }

    /// Commit an encoder result if its ticket is still the newest.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<RgbaImage, EncodeError>,
    ) -> SyncOutcome {
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                latest = self.generation,
                "Discarding stale render"
            );
            return SyncOutcome::Stale;
        }

        match result {
            Ok(image) => {
                self.surface.commit(image);
                self.last_error = None;
                SyncOutcome::Rendered
            }
            Err(e) => {
                warn!(error = %e, "Error generating code; keeping last render");
                self.last_error = Some(e.clone());
                SyncOutcome::Rejected(e)
            }
        }
    }
}
