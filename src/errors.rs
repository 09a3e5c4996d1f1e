use std::{fmt, io, num::TryFromIntError};
use font_kit::error::{FontLoadingError, GlyphLoadingError, SelectionError};
use png::{DecodingError, EncodingError};

#[derive(Debug)]
pub struct Error {
    pub message: String,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<EncodingError> for Error {
    fn from(value: EncodingError) -> Self {
        Error {
            message: format!("PNG encoding failed: {}", value)
        }
    }
}

impl From<DecodingError> for Error {
    fn from(value: DecodingError) -> Self {
        Error {
            message: format!("PNG decoding failed: {}", value)
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error {
            message: format!("Invalid render config: {}", value)
        }
    }
}

impl From<SelectionError> for Error {
    fn from(value: SelectionError) -> Self {
        Error {
            message: format!("No usable font: {}", value)
        }
    }
}

impl From<FontLoadingError> for Error {
    fn from(value: FontLoadingError) -> Self {
        Error {
            message: format!("Could not load font: {}", value)
        }
    }
}

impl From<GlyphLoadingError> for Error {
    fn from(value: GlyphLoadingError) -> Self {
        Error {
            message: format!("Could not load glyph: {}", value)
        }
    }
}

impl From<TryFromIntError> for Error {
    fn from(value: TryFromIntError) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error {
            message: value
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
