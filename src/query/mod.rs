//! Request composition: parameter bags, GET query strings and POST form bodies.

mod composer;
mod params;

pub use composer::{Charset, QueryComposer};
pub use params::ParamBag;

#[derive(Debug, thiserror::Error)]
/// Errors raised while composing a request.
///
/// These are surfaced to the caller of the composing operation; nothing is logged and dropped.
pub enum ComposeError {
    /// A parameter name was empty.
    #[error("parameter name must not be empty")]
    EmptyKey,

    /// The base URL could not be parsed.
    #[error("invalid base url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A parameter name or value cannot be represented in the selected charset.
    #[error("cannot encode {value:?} as {charset}")]
    Encoding { charset: Charset, value: String },
}
