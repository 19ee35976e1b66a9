use grimoire_core::RecordId;
use thiserror::Error;

/// The request never produced an HTTP response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("could not reach catalog server: {0}")]
    Unreachable(String),

    #[error("request to catalog server timed out")]
    Timeout,

    #[error("could not build HTTP client: {0}")]
    Setup(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with an error envelope.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("unexpected response from catalog server: {0}")]
    Decode(String),

    #[error("could not encode request body: {0}")]
    Encode(String),

    #[error("invalid catalog URL: {0}")]
    InvalidUrl(String),

    #[error("record {0} is not displayed")]
    NotDisplayed(RecordId),

    #[error("form has no field `{0}`")]
    UnknownField(String),
}
