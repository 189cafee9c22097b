pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing `flowchart` header")]
    MissingHeader,

    #[error("unknown direction token: {token}")]
    UnknownDirection { token: String },

    #[error("flowchart parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
