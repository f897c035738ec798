use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaveError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // Sampler ran out of attempts; distances are in grid units
    #[error(
        "infeasible constraint: no walkable point between {min_distance:.2} and {max_distance:.2} units after {attempts} attempts"
    )]
    InfeasibleConstraint {
        attempts: u32,
        min_distance: f32,
        max_distance: f32,
    },

    // Flat buffer length != width × height
    #[error("grid buffer has {actual} cells, expected {expected}")]
    GridSize { expected: usize, actual: usize },

    #[error("no cave has been generated yet")]
    NotGenerated,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type CaveResult<T> = Result<T, CaveError>;
