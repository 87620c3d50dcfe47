pub type VexelResult<T> = Result<T, VexelError>;

#[derive(thiserror::Error, Debug)]
pub enum VexelError {
    /// The external animation/graphics library refused the source file.
    #[error("load error: {0}")]
    Load(String),

    /// The source is readable but cannot be imported (degenerate geometry,
    /// missing start frame, bad options).
    #[error("import error: {0}")]
    Import(String),

    #[error("svg error: {0}")]
    Svg(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VexelError {
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    pub fn import(msg: impl Into<String>) -> Self {
        Self::Import(msg.into())
    }

    pub fn svg(msg: impl Into<String>) -> Self {
        Self::Svg(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
