//! Transport layer: wire-format details (request parameters, plain-text replies).

mod account;
mod reply;
mod send_sms;

pub use account::{decode_balance_response, decode_login_response};
pub use reply::decode_reply;
pub use send_sms::{encode_schedule_form, encode_send_batch_form, encode_send_sms_form};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("balance response is not a number: {body:?}")]
    InvalidBalance { body: String },
}
