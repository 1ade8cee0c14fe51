use blade_loads::error::BladeError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to start {solver}: {source}")]
    Spawn {
        solver: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{solver} did not finish within {seconds} s and was killed")]
    Timeout { solver: String, seconds: u64 },
    #[error("{solver} exited with status {status}: {detail}")]
    Failed {
        solver: String,
        status: String,
        detail: String,
    },
    #[error("Parsing error: {0}")]
    Parse(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<SessionError> for BladeError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Timeout { solver, seconds } => BladeError::SolverTimeout { solver, seconds },
            SessionError::Io(e) => BladeError::Io(e),
            other => BladeError::Solver(other.to_string()),
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_stays_retryable() {
        let err: BladeError = SessionError::Timeout {
            solver: "xfoil".to_string(),
            seconds: 5,
        }
        .into();
        assert!(err.is_retryable());

        let err: BladeError = SessionError::Parse("no header".to_string()).into();
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("no header"));
    }
}
