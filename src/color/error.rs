use thiserror::Error;

/// Validation failures raised while building or parsing a [`HexColor`](super::HexColor).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexColorError {
    #[error("RGB must be hex.")]
    InvalidHex,
    #[error("each of RGB must be 2 length.")]
    InvalidLength,
    #[error("alpha must be float. (0 <= alpha <= 1): {0}")]
    InvalidAlpha(String),
    #[error("0 <= alpha <= 1.")]
    AlphaOutOfRange,
    #[error("hex_color_code is wrong.")]
    MalformedCode,
}
