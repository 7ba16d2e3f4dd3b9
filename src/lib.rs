//! Typed Rust client for the BBN bulk SMS HTTP API.
//!
//! The crate is split into layers:
//! - [`config`]: layered `key=value` sources with include chaining and endpoint resolution,
//! - [`query`]: parameter bags and GET/POST request composition,
//! - [`domain`]: strong types with validation,
//! - [`client`]: the async client orchestrating requests.
//!
//! ```rust,no_run
//! use bbnsms::{BbnClient, Config, MessageText, RawPhoneNumber, SenderId, Sms};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), bbnsms::BbnError> {
//!     let mut config = Config::load()?;
//!     config.set_username("user@example.com");
//!     config.set_password("secret");
//!
//!     let client = BbnClient::new(config);
//!     let sms = Sms::new(
//!         SenderId::new("victor")?,
//!         RawPhoneNumber::new("2347031234567")?,
//!         MessageText::new("hello")?,
//!     );
//!     let _resp = client.send_message(&sms).await?;
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod domain;
pub mod query;
mod transport;

pub use client::{BbnClient, BbnClientBuilder, BbnError, Credentials};
pub use config::{Config, ConfigError, ConfigLoader, Endpoint, SkippedSource};
pub use domain::{
    BalanceResponse, KnownResponseCode, LoginResponse, MessageText, Password, PhoneNumber,
    RawPhoneNumber, ResponseCode, ScheduleName, ScheduleOptions, SendResponse, SenderId, Sms,
    SmsGroup, UnixTimestamp, Username, ValidationError,
};
pub use query::{Charset, ComposeError, ParamBag, QueryComposer};
