//! Crate error type shared by the burst overlay and the sticker compositor.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors surfaced by the effects layer.
///
/// Declined environments (reduced motion) are not errors: those paths return
/// `Ok(None)` and do nothing.
#[derive(Debug, Error)]
pub enum FxError {
    #[error("no window")]
    NoWindow,

    #[error("no document")]
    NoDocument,

    #[error("2d context unavailable")]
    NoContext,

    /// A DOM or canvas call threw.
    #[error("js error: {0}")]
    Js(String),

    #[error("image failed to load: {url}")]
    ImageLoad { url: String },

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

impl From<JsValue> for FxError {
    fn from(value: JsValue) -> Self {
        let msg = value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}"));
        FxError::Js(msg)
    }
}

impl From<FxError> for JsValue {
    fn from(err: FxError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type FxResult<T> = Result<T, FxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_load_message_names_url() {
        let err = FxError::ImageLoad { url: "images/noah.png".into() };
        assert_eq!(err.to_string(), "image failed to load: images/noah.png");
    }

    #[test]
    fn bad_json_maps_to_invalid_options() {
        let err: FxError = serde_json::from_str::<u32>("{").unwrap_err().into();
        assert!(matches!(err, FxError::InvalidOptions(_)));
    }
}
