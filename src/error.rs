/// Errors raised while encoding a symbol or writing it out.
///
/// Ways to handle [`EncodeError::CapacityExceeded`]:
///
/// - Decrease the error correction level if it was greater than `QrCodeEcc::Low`.
/// - Split the text into segments that fit a denser mode (numeric or alphanumeric).
/// - Shorten the data.
/// - Propagate the error upward to the caller/user.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// An argument was empty, malformed or out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The data does not fit in a version 40 symbol at the requested level.
    #[error("data length = {required_bits} bits, max capacity = {capacity_bits} bits")]
    CapacityExceeded {
        required_bits: usize,
        capacity_bits: usize,
    },

    /// A symbol was requested before anything was encoded.
    #[error("no QR code has been encoded yet")]
    PrematureUse,

    /// The output sink failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EncodeError {
    /// Shorthand for [`EncodeError::InvalidArgument`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
