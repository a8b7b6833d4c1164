//! # Codegen Pro CLI
//!
//! Command-line interface for generating QR codes and barcodes.
//!
//! ## Usage
//!
//! ```bash
//! # Start the browser configurator
//! codegen-pro serve --listen 127.0.0.1:8080
//!
//! # Render the default QR code to ./out as PNG and SVG
//! codegen-pro render --out out
//!
//! # EAN-13 barcode, PNG only
//! codegen-pro render --type barcode --format EAN13 --content 590123412345 --export png
//!
//! # Start from an options file, override one field
//! codegen-pro render --options my-style.json --content "https://example.com"
//!
//! # List QR presets, print random content
//! codegen-pro presets
//! codegen-pro random --type barcode
//! ```

use chrono::Local;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use codegen_pro::{
    Action, BarcodeFormat, CodeType, CodegenError, Color, ConfigurableCodeRenderer, QrErrorLevel,
    RenderOptions, config,
    export::{DirectorySaver, ExportFormat, FileSaver},
    presets, reduce,
    server::{self, DEFAULT_LISTEN_ADDR, SESSION_EXPIRATION_SECS, ServerConfig},
};

/// Codegen Pro - QR code and barcode generator
#[derive(Parser, Debug)]
#[command(name = "codegen-pro")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the browser configurator
    Serve {
        /// Address to listen on
        #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
        listen: String,

        /// Seconds of inactivity before a session is dropped
        #[arg(long, default_value_t = SESSION_EXPIRATION_SECS)]
        session_ttl: u64,
    },

    /// Render a code and save it to disk
    Render {
        /// JSON options file to start from
        #[arg(long, value_name = "FILE")]
        options: Option<PathBuf>,

        /// Code type: qr or barcode
        #[arg(long = "type", value_parser = parse_code_type)]
        code_type: Option<CodeType>,

        /// Content to encode
        #[arg(long)]
        content: Option<String>,

        /// Barcode symbology (CODE128, EAN13, ...)
        #[arg(long, value_parser = parse_barcode_format)]
        format: Option<BarcodeFormat>,

        /// QR error correction level (L, M, Q, H)
        #[arg(long, value_parser = parse_level)]
        level: Option<QrErrorLevel>,

        /// QR edge length in pixels
        #[arg(long)]
        size: Option<u32>,

        /// Margin in pixels
        #[arg(long)]
        margin: Option<u32>,

        /// Barcode module width in pixels
        #[arg(long)]
        width: Option<f32>,

        /// Barcode bar height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Barcode text size in pixels
        #[arg(long)]
        font_size: Option<u32>,

        /// Foreground color (hex)
        #[arg(long, value_parser = parse_color)]
        line_color: Option<Color>,

        /// Background color (hex)
        #[arg(long, value_parser = parse_color)]
        background: Option<Color>,

        /// Hide the human-readable barcode text
        #[arg(long)]
        no_text: bool,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Formats to write
        #[arg(long, value_delimiter = ',', default_value = "png,svg", value_parser = parse_export_format)]
        export: Vec<ExportFormat>,
    },

    /// List QR content presets
    Presets,

    /// Print random content for a code type
    Random {
        /// Code type: qr or barcode
        #[arg(long = "type", default_value = "qr", value_parser = parse_code_type)]
        code_type: CodeType,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn parse_code_type(s: &str) -> Result<CodeType, String> {
    CodeType::parse(s).ok_or_else(|| format!("unknown code type '{}' (expected qr or barcode)", s))
}

fn parse_barcode_format(s: &str) -> Result<BarcodeFormat, String> {
    BarcodeFormat::parse(s).ok_or_else(|| {
        let names: Vec<_> = BarcodeFormat::ALL.iter().map(|f| f.name()).collect();
        format!("unknown format '{}' (expected one of {})", s, names.join(", "))
    })
}

fn parse_level(s: &str) -> Result<QrErrorLevel, String> {
    QrErrorLevel::parse(s).ok_or_else(|| format!("unknown level '{}' (expected L, M, Q or H)", s))
}

fn parse_color(s: &str) -> Result<Color, String> {
    Color::parse(s).map_err(|e| e.to_string())
}

fn parse_export_format(s: &str) -> Result<ExportFormat, String> {
    ExportFormat::parse(s).ok_or_else(|| format!("unknown export format '{}'", s))
}

fn main() {
    // Set RUST_LOG to control log level, e.g. RUST_LOG=codegen_pro=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), CodegenError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            listen,
            session_ttl,
        } => {
            let config = ServerConfig {
                listen_addr: listen,
                session_ttl: Duration::from_secs(session_ttl),
            };
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(config))
        }

        Commands::Render {
            options,
            code_type,
            content,
            format,
            level,
            size,
            margin,
            width,
            height,
            font_size,
            line_color,
            background,
            no_text,
            out,
            export,
        } => {
            let base = match options {
                Some(path) => config::load_options(&path)?,
                None => RenderOptions::default(),
            };

            // Type first: switching type resets content
            let mut actions = Vec::new();
            actions.extend(code_type.map(Action::SetCodeType));
            actions.extend(format.map(Action::SetBarcodeFormat));
            actions.extend(level.map(Action::SetQrErrorLevel));
            actions.extend(size.map(Action::SetQrSize));
            actions.extend(margin.map(Action::SetMargin));
            actions.extend(width.map(Action::SetWidth));
            actions.extend(height.map(Action::SetHeight));
            actions.extend(font_size.map(Action::SetFontSize));
            actions.extend(line_color.map(Action::SetLineColor));
            actions.extend(background.map(Action::SetBackgroundColor));
            if no_text {
                actions.push(Action::SetDisplayValue(false));
            }
            actions.extend(content.map(Action::SetContent));

            let options = actions
                .into_iter()
                .fold(base, |opts, action| reduce(opts, action.clamped()));

            let renderer = ConfigurableCodeRenderer::with_options(options);
            if let Some(e) = renderer.last_error() {
                return Err(e.clone().into());
            }

            let saver = DirectorySaver::new(out);
            for format in export {
                let download = match format {
                    ExportFormat::Png => renderer.export_png()?,
                    ExportFormat::Svg => renderer.export_svg()?,
                };
                let path = saver.save(&download)?;
                println!("{}", path.display());
            }
            Ok(())
        }

        Commands::Presets => {
            println!("QR presets:");
            for p in presets::QR_PRESETS {
                println!("  {:<10} {} {:<12} {}", p.id, p.icon, p.name, p.value);
            }
            Ok(())
        }

        Commands::Random { code_type, seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            let content = presets::random_content(code_type, &mut rng, Local::now().date_naive());
            info!(%code_type, "Random content");
            println!("{}", content);
            Ok(())
        }
    }
}
