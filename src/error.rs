pub type CaseResult<T> = Result<T, CaseError>;

#[derive(thiserror::Error, Debug)]
pub enum CaseError {
    #[error("input error: {0}")]
    Input(String),

    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("composite error: {0}")]
    Composite(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("checkout error: {0}")]
    Checkout(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CaseError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    pub fn composite(msg: impl Into<String>) -> Self {
        Self::Composite(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn checkout(msg: impl Into<String>) -> Self {
        Self::Checkout(msg.into())
    }

    /// Stable kind tag for operator logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Input(_) => "input",
            Self::Geometry(_) => "geometry",
            Self::Composite(_) => "composite",
            Self::Persistence(_) => "persistence",
            Self::Checkout(_) => "checkout",
            Self::Other(_) => "other",
        }
    }

    /// The single message shown to end users; the precise kind stays in logs.
    pub fn user_message(&self) -> &'static str {
        "Oops! Something went wrong, please try again."
    }
}
