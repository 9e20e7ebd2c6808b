use thiserror::Error;

/// Failures while resolving the tokens for a round.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token {id} payload is missing `{field}`")]
    Decode { id: u32, field: &'static str },
    #[error("no token with id {0}")]
    UnknownId(u32),
    #[error("token catalog `{0}` is missing or unreadable")]
    Catalog(String),
    #[error("token id range {start}..={end} is empty")]
    EmptyRange { start: u32, end: u32 },
}

#[derive(Debug, Error)]
pub enum GameError {
    /// A click arrived tagged with something that is not a card position.
    #[error("malformed card position `{0}`")]
    MalformedPosition(String),
    #[error(transparent)]
    TokenFetch(#[from] TokenError),
    #[error("a round is already running")]
    RoundInProgress,
    #[error("no round is running")]
    NoActiveRound,
    #[error("board of {cells} cells does not pair up {tokens} tokens")]
    BoardMismatch { cells: usize, tokens: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = GameError::MalformedPosition("card-x".into());
        assert_eq!(err.to_string(), "malformed card position `card-x`");

        let err = GameError::from(TokenError::UnknownId(9000));
        assert_eq!(err.to_string(), "no token with id 9000");
    }
}
