//! # qrpng
//!
//! A Rust library for encoding data into QR codes and writing them as compact PNG images.
//!
//! `qrpng` encodes one or more byte segments into a QR Code Model 2 symbol. It supports
//! versions 1 to 40, four error correction levels and an optional ECI header. The finished
//! symbol is serialized by a small built-in writer as a 1-bit grayscale PNG.
//!
//! ## Features
//!
//! - Encode data in numeric, alphanumeric or byte mode, chosen per segment.
//! - Support four error correction levels: Low, Medium, Quartile, High.
//! - Pick the smallest version that fits and the mask with the lowest penalty.
//! - Render QR codes as PNG bytes, text, or in-memory image buffers.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qrpng = "0.1" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! Encode a URL and write it to a file:
//!
//! ```rust,no_run
//! use qrpng::{QrCodeEcc, QrEncoder};
//!
//! fn main() -> Result<(), qrpng::EncodeError> {
//!     let mut encoder = QrEncoder::new()
//!         .error_correction(QrCodeEcc::High)
//!         .module_size(6)?;
//!     encoder.encode_text("https://example.com")?;
//!     let file = std::fs::File::create("qr.png")?;
//!     encoder.write_png(file)
//! }
//! ```
//!
//! Print a symbol to the console:
//!
//! ```rust
//! use qrpng::{QrCode, QrCodeEcc};
//!
//! let qr = QrCode::encode_text("Hello, World!", QrCodeEcc::Low).unwrap();
//! print!("{}", qr);
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: The encoded symbol and the encoder front end.
//! - [`segment`]: Mode classification and version selection.
//! - [`bitstream`]: Data codeword packing.
//! - [`ecc`]: Reed-Solomon error correction and interleaving.
//! - [`matrix`]: Function patterns, codeword placement and format information.
//! - [`mask`]: Mask patterns and penalty scoring.
//! - [`png`]: The PNG writer.
//! - [`tables`]: Constant tables from the QR Code standard.
#![forbid(unsafe_code)]

pub mod bitstream;
pub mod ecc;
pub mod error;
pub mod mask;
pub mod matrix;
pub mod png;
pub mod qrcode;
pub mod segment;
pub mod tables;

pub use error::EncodeError;
pub use png::PngOptions;
pub use qrcode::{Mask, QrCode, QrCodeEcc, QrEncoder, Version};
pub use segment::{DataSegment, SegmentMode, SymbolPlan};
