use std::fmt;

use url::{Url, form_urlencoded};

use super::{ComposeError, ParamBag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Character set used to turn parameter text into bytes before percent-encoding.
pub enum Charset {
    #[default]
    Utf8,
    /// ISO-8859-1. Characters above `U+00FF` cannot be represented.
    Latin1,
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => f.write_str("UTF-8"),
            Self::Latin1 => f.write_str("ISO-8859-1"),
        }
    }
}

#[derive(Debug, Clone)]
/// Builds request URLs and form bodies from a base URL plus a [`ParamBag`].
///
/// The base URL is split once at construction into scheme, host and path. Any
/// query string it already carries is decoded into the parameter bag, so
/// parameters added later accumulate after the pre-existing ones.
///
/// ```rust
/// use bbnsms::query::QueryComposer;
///
/// let mut composer = QueryComposer::new("https://gateway.example/sms/send.php?lang=en")?;
/// composer.add_param("message", "hello world")?;
/// assert_eq!(
///     composer.build_query_url()?,
///     "https://gateway.example/sms/send.php?lang=en&message=hello+world"
/// );
/// assert_eq!(composer.build_form_body()?, "lang=en&message=hello+world");
/// # Ok::<(), bbnsms::query::ComposeError>(())
/// ```
pub struct QueryComposer {
    scheme: String,
    host: String,
    path: String,
    params: ParamBag,
    charset: Charset,
}

impl QueryComposer {
    /// Parse `base` into its parts. A base without a scheme (`host/path` or
    /// `host:port/path`) is accepted and renders without one. A base that still has no
    /// host is rejected.
    pub fn new(base: &str) -> Result<Self, ComposeError> {
        let invalid = |source| ComposeError::InvalidUrl {
            url: base.to_owned(),
            source,
        };

        // `host:port/path` parses as scheme `host` with an opaque path.
        let (parsed, scheme) = match Url::parse(base) {
            Ok(parsed) if !parsed.cannot_be_a_base() => {
                let scheme = parsed.scheme().to_owned();
                (parsed, scheme)
            }
            Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => {
                let parsed = Url::parse(&format!("http://{base}")).map_err(invalid)?;
                (parsed, String::new())
            }
            Err(source) => return Err(invalid(source)),
        };

        let host = match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_owned(),
            (None, _) => return Err(invalid(url::ParseError::EmptyHost)),
        };

        let mut params = ParamBag::new();
        if let Some(query) = parsed.query() {
            for pair in query.split('&') {
                // Fragments without a `key=` part carry nothing to replay.
                match pair.split_once('=') {
                    Some((key, _)) if !key.is_empty() => {}
                    _ => continue,
                }
                if let Some((key, value)) = form_urlencoded::parse(pair.as_bytes()).next() {
                    params.add(key, value)?;
                }
            }
        }

        Ok(Self {
            scheme,
            host,
            path: parsed.path().to_owned(),
            params,
            charset: Charset::default(),
        })
    }

    /// Select the charset used by [`build_query_url`](Self::build_query_url) and
    /// [`build_form_body`](Self::build_form_body).
    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    pub fn add_param(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, ComposeError> {
        self.params.add(key, value)?;
        Ok(self)
    }

    /// Merge a whole bag; values for a shared key are appended after the existing ones.
    pub fn add_params(&mut self, params: &ParamBag) -> &mut Self {
        self.params.extend_from(params);
        self
    }

    pub fn remove_param(&mut self, key: &str) -> &mut Self {
        self.params.remove(key);
        self
    }

    pub fn contains_param(&self, key: &str) -> bool {
        self.params.contains(key)
    }

    pub fn params(&self) -> &ParamBag {
        &self.params
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// `scheme://host/path` without any query string.
    pub fn build_path(&self) -> String {
        let mut out = String::with_capacity(self.host.len() + self.path.len() + 16);
        if !self.scheme.is_empty() {
            out.push_str(&self.scheme);
            out.push_str("://");
        }
        out.push_str(&self.host);
        out.push_str(&self.path);
        out
    }

    /// Full GET URL. The `?` separator is only emitted when there is at least one parameter.
    pub fn build_query_url(&self) -> Result<String, ComposeError> {
        let query = self.encode_pairs()?;
        let mut out = self.build_path();
        if !query.is_empty() {
            out.push('?');
            out.push_str(&query);
        }
        Ok(out)
    }

    /// `application/x-www-form-urlencoded` body for a POST to [`build_path`](Self::build_path).
    pub fn build_form_body(&self) -> Result<String, ComposeError> {
        self.encode_pairs()
    }

    fn encode_pairs(&self) -> Result<String, ComposeError> {
        let mut out = String::new();
        for (key, value) in self.params.pairs() {
            if !out.is_empty() {
                out.push('&');
            }
            out.push_str(&self.encode(key)?);
            out.push('=');
            out.push_str(&self.encode(value)?);
        }
        Ok(out)
    }

    fn encode(&self, input: &str) -> Result<String, ComposeError> {
        match self.charset {
            Charset::Utf8 => Ok(form_urlencoded::byte_serialize(input.as_bytes()).collect()),
            Charset::Latin1 => {
                let bytes = input
                    .chars()
                    .map(u8::try_from)
                    .collect::<Result<Vec<u8>, _>>()
                    .map_err(|_| ComposeError::Encoding {
                        charset: self.charset,
                        value: input.to_owned(),
                    })?;
                Ok(form_urlencoded::byte_serialize(&bytes).collect())
            }
        }
    }
}
