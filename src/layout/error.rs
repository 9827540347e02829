use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("measurement of {text:?} is not usable (width {width}, height {height})")]
    InvalidMeasurement {
        text: String,
        width: f32,
        height: f32,
    },
    #[error("invalid layout config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
