use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The host could not hand out a 2-D drawing context.
    #[error("drawing surface unavailable")]
    SurfaceUnavailable,

    #[error("invalid snow config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("particle count must be at least 1")]
    EmptyParticleStore,
}
