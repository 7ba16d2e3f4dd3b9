//! Client layer: resolves endpoints, composes requests and maps replies to domain types.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::config::{Config, ConfigError, ConfigLoader, Endpoint};
use crate::domain::{
    BalanceResponse, KnownResponseCode, LoginResponse, Password, ResponseCode, ScheduleOptions,
    SendResponse, Sms, SmsGroup, Username, ValidationError,
};
use crate::query::{Charset, ComposeError, ParamBag, QueryComposer};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn get<'a>(
        &'a self,
        url: &'a str,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;

    fn post_form<'a>(
        &'a self,
        url: &'a str,
        body: String,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    async fn read(response: reqwest::Response) -> Result<HttpResponse, reqwest::Error> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get<'a>(
        &'a self,
        url: &'a str,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self.client.get(url).send().await?;
            Ok(Self::read(response).await?)
        })
    }

    fn post_form<'a>(
        &'a self,
        url: &'a str,
        body: String,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(body)
                .send()
                .await?;
            Ok(Self::read(response).await?)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Username/password pair sent with every gateway call.
pub struct Credentials {
    username: Username,
    password: Password,
}

impl Credentials {
    /// Validate and pair a username with its password.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            password: Password::new(password)?,
        })
    }

    /// Read the `username` and `password` keys. Missing keys fail validation as empty values.
    pub fn from_config(config: &Config) -> Result<Self, ValidationError> {
        Self::new(
            config.username().unwrap_or_default(),
            config.password().unwrap_or_default(),
        )
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn password(&self) -> &Password {
        &self.password
    }

    fn push_params(&self, params: &mut ParamBag) -> Result<(), ComposeError> {
        params
            .add(Username::FIELD, self.username.as_str())?
            .add(Password::FIELD, self.password.as_str())?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`BbnClient`].
///
/// This error preserves:
/// - HTTP-level failures (non-2xx status or transport failures),
/// - gateway-level failures (the reply does not carry the expected success code),
/// - configuration, composition and validation failures.
pub enum BbnError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status code returned by the server.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// The gateway rejected the request.
    #[error("API error: {code:?} {body:?}")]
    Api {
        code: Option<ResponseCode>,
        body: String,
    },

    /// Response body could not be parsed as the expected format.
    #[error("parse error: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),

    /// The configuration has no URL for the requested endpoint.
    #[error("no {0} endpoint configured")]
    MissingEndpoint(Endpoint),

    /// Building the request URL or body failed.
    #[error("compose error: {0}")]
    Compose(#[from] ComposeError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone)]
/// Builder for [`BbnClient`].
///
/// Use this when you need to customize the timeout, user-agent or form charset.
pub struct BbnClientBuilder {
    config: Config,
    charset: Charset,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl BbnClientBuilder {
    /// Create a builder around an already loaded [`Config`].
    pub fn new(config: Config) -> Self {
        Self {
            config,
            charset: Charset::default(),
            timeout: None,
            user_agent: None,
        }
    }

    /// Charset for POST form bodies. GET query strings are always UTF-8.
    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`BbnClient`].
    pub fn build(self) -> Result<BbnClient, BbnError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| BbnError::Transport(Box::new(err)))?;

        Ok(BbnClient {
            config: Arc::new(RwLock::new(self.config)),
            charset: self.charset,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// High-level BBN SMS client.
///
/// The client owns its [`Config`] behind a lock; clones share it. Every call
/// resolves its endpoint from the current configuration, so toggling
/// [`BbnClient::set_secure`] or reloading takes effect on the next request.
///
/// Calls without an `_as` suffix use the `username`/`password` keys of the config.
///
/// ```rust,no_run
/// use bbnsms::{BbnClient, Config, MessageText, RawPhoneNumber, SenderId, Sms};
///
/// # async fn run() -> Result<(), bbnsms::BbnError> {
/// let client = BbnClient::new(Config::load()?);
/// client.set_secure(true);
/// let sms = Sms::new(
///     SenderId::new("victor")?,
///     RawPhoneNumber::new("2347031234567")?,
///     MessageText::new("hello")?,
/// );
/// let sent = client.send_message(&sms).await?;
/// println!("{:?}", sent.code);
/// # Ok(())
/// # }
/// ```
pub struct BbnClient {
    config: Arc<RwLock<Config>>,
    charset: Charset,
    http: Arc<dyn HttpTransport>,
}

impl BbnClient {
    /// Create a client with default HTTP settings.
    ///
    /// For more customization, use [`BbnClient::builder`].
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            charset: Charset::default(),
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
        }
    }

    /// Start building a client with custom settings.
    pub fn builder(config: Config) -> BbnClientBuilder {
        BbnClientBuilder::new(config)
    }

    /// Run `f` against the current configuration.
    pub fn with_config<R>(&self, f: impl FnOnce(&Config) -> R) -> R {
        let config = self.config.read().unwrap_or_else(PoisonError::into_inner);
        f(&config)
    }

    /// Mutate the configuration in place.
    pub fn update_config<R>(&self, f: impl FnOnce(&mut Config) -> R) -> R {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut config)
    }

    /// Re-run `loader` and replace the whole configuration with the result.
    ///
    /// Values set at runtime (credentials, the secure flag) are discarded unless the
    /// loaded sources carry them; use [`BbnClient::reload_into`] to keep them. On error
    /// the current configuration is kept.
    pub fn reload(&self, loader: &ConfigLoader) -> Result<(), BbnError> {
        let fresh = loader.load()?;
        self.update_config(|config| *config = fresh);
        Ok(())
    }

    /// Re-run `loader` on top of the current configuration. Loaded keys overwrite, every
    /// other value is kept. On error the current configuration is kept.
    pub fn reload_into(&self, loader: &ConfigLoader) -> Result<(), BbnError> {
        self.update_config(|config| {
            let mut merged = config.clone();
            loader.load_into(&mut merged)?;
            *config = merged;
            Ok(())
        })
    }

    /// Select https (`true`) or plain http for subsequent requests.
    pub fn set_secure(&self, secure: bool) {
        self.update_config(|config| config.set_secure(secure));
    }

    pub fn is_secure(&self) -> bool {
        self.with_config(Config::is_secure)
    }

    /// Resolve the full URL of `endpoint` as the next request would.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> Result<String, BbnError> {
        self.with_config(|config| config.endpoint(endpoint))
            .ok_or(BbnError::MissingEndpoint(endpoint))
    }

    /// Credentials stored in the configuration.
    pub fn default_credentials(&self) -> Result<Credentials, BbnError> {
        Ok(self.with_config(Credentials::from_config)?)
    }

    /// Check the configured credentials against the gateway.
    pub async fn login(&self) -> Result<LoginResponse, BbnError> {
        let credentials = self.default_credentials()?;
        self.login_as(&credentials).await
    }

    /// Check `credentials` against the gateway.
    ///
    /// An invalid pair is not an error: it yields `valid == false`.
    pub async fn login_as(&self, credentials: &Credentials) -> Result<LoginResponse, BbnError> {
        let mut params = ParamBag::new();
        credentials.push_params(&mut params)?;

        let body = self.get(Endpoint::Auth, &params).await?;
        Ok(crate::transport::decode_login_response(&body))
    }

    /// Fetch the remaining credit for the configured account.
    pub async fn check_balance(&self) -> Result<BalanceResponse, BbnError> {
        let credentials = self.default_credentials()?;
        self.check_balance_as(&credentials).await
    }

    /// Fetch the remaining credit for `credentials`.
    ///
    /// Errors with [`BbnError::Parse`] when the reply is not a number (the gateway answers
    /// rejected credentials with an error text).
    pub async fn check_balance_as(
        &self,
        credentials: &Credentials,
    ) -> Result<BalanceResponse, BbnError> {
        let mut params = ParamBag::new();
        credentials.push_params(&mut params)?;

        let body = self.get(Endpoint::Balance, &params).await?;
        crate::transport::decode_balance_response(&body)
            .map_err(|err| BbnError::Parse(Box::new(err)))
    }

    /// Send one message using the configured credentials.
    pub async fn send_message(&self, sms: &Sms) -> Result<SendResponse, BbnError> {
        let credentials = self.default_credentials()?;
        self.send_message_as(sms, &credentials).await
    }

    /// Send one message.
    ///
    /// Errors:
    /// - [`BbnError::Api`] when the reply does not carry code 1801 (message sent),
    /// - [`BbnError::HttpStatus`] for non-2xx HTTP responses.
    pub async fn send_message_as(
        &self,
        sms: &Sms,
        credentials: &Credentials,
    ) -> Result<SendResponse, BbnError> {
        let mut params = ParamBag::new();
        credentials.push_params(&mut params)?;
        crate::transport::encode_send_sms_form(sms, &mut params)?;

        let body = self.post(Endpoint::Send, &params).await?;
        expect_code(&body, KnownResponseCode::MessageSent)
    }

    /// Send one message to every recipient of `group` using the configured credentials.
    pub async fn send_batch_message(&self, group: &SmsGroup) -> Result<SendResponse, BbnError> {
        let credentials = self.default_credentials()?;
        self.send_batch_message_as(group, &credentials).await
    }

    /// Send one message to every recipient of `group`.
    pub async fn send_batch_message_as(
        &self,
        group: &SmsGroup,
        credentials: &Credentials,
    ) -> Result<SendResponse, BbnError> {
        let mut params = ParamBag::new();
        credentials.push_params(&mut params)?;
        crate::transport::encode_send_batch_form(group, &mut params)?;

        let body = self.post(Endpoint::Send, &params).await?;
        expect_code(&body, KnownResponseCode::MessageSent)
    }

    /// Schedule a broadcast using the configured credentials.
    pub async fn schedule_message(
        &self,
        group: &SmsGroup,
        options: &ScheduleOptions,
    ) -> Result<SendResponse, BbnError> {
        let credentials = self.default_credentials()?;
        self.schedule_message_as(group, options, &credentials).await
    }

    /// Schedule a broadcast of `group` at `options.broadcast_time`.
    ///
    /// Succeeds when the reply carries code 1901 (schedule saved).
    pub async fn schedule_message_as(
        &self,
        group: &SmsGroup,
        options: &ScheduleOptions,
        credentials: &Credentials,
    ) -> Result<SendResponse, BbnError> {
        let mut params = ParamBag::new();
        credentials.push_params(&mut params)?;
        crate::transport::encode_schedule_form(group, options, &mut params)?;

        let body = self.post(Endpoint::Schedule, &params).await?;
        expect_code(&body, KnownResponseCode::ScheduleSaved)
    }

    async fn get(&self, endpoint: Endpoint, params: &ParamBag) -> Result<String, BbnError> {
        let mut composer = QueryComposer::new(&self.endpoint_url(endpoint)?)?;
        composer.add_params(params);
        let url = composer.build_query_url()?;

        tracing::debug!(%endpoint, path = %composer.build_path(), "GET");
        let response = self.http.get(&url).await.map_err(BbnError::Transport)?;
        into_body(response)
    }

    async fn post(&self, endpoint: Endpoint, params: &ParamBag) -> Result<String, BbnError> {
        let mut composer = QueryComposer::new(&self.endpoint_url(endpoint)?)?.charset(self.charset);
        composer.add_params(params);
        let url = composer.build_path();
        let body = composer.build_form_body()?;

        tracing::debug!(%endpoint, path = %url, "POST");
        let response = self
            .http
            .post_form(&url, body)
            .await
            .map_err(BbnError::Transport)?;
        into_body(response)
    }
}

fn into_body(response: HttpResponse) -> Result<String, BbnError> {
    if !(200..=299).contains(&response.status) {
        let body = if response.body.trim().is_empty() {
            None
        } else {
            Some(response.body)
        };
        return Err(BbnError::HttpStatus {
            status: response.status,
            body,
        });
    }
    Ok(response.body)
}

fn expect_code(body: &str, expected: KnownResponseCode) -> Result<SendResponse, BbnError> {
    let reply = crate::transport::decode_reply(body);
    let expected = ResponseCode::from(expected);
    if reply.contains(expected) {
        return Ok(SendResponse {
            code: expected,
            body: reply.body.trim().to_owned(),
        });
    }

    tracing::debug!(code = ?reply.primary_code(), "gateway rejected request");
    Err(BbnError::Api {
        code: reply.primary_code(),
        body: reply.body.trim().to_owned(),
    })
}
