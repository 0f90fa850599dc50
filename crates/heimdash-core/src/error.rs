// ── Core error types ──
//
// The only operation that surfaces errors to callers is the light write
// path — refresh failures are logged inside the refreshers and never
// escape. Everything else here covers construction-time problems.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The bridge write itself failed (transport error or non-success
    /// status). Distinct from a successful write the bridge rejected at
    /// the attribute level — those come back as a normal acknowledgement.
    #[error("Light command failed: {0}")]
    LightCommand(#[from] heimdash_api::Error),

    /// QR encoding of the Wi-Fi join string failed.
    #[error("QR encoding failed: {0}")]
    Qr(#[from] qrcode::types::QrError),

    /// Invalid runtime configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },
}
