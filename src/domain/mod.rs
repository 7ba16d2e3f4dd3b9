//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::{SMS_GROUP_MAX_RECIPIENTS, ScheduleOptions, Sms, SmsGroup};
pub use response::{BalanceResponse, LoginResponse, SendResponse};
pub use validation::ValidationError;
pub use value::{
    KnownResponseCode, MessageText, Password, PhoneNumber, RawPhoneNumber, ResponseCode,
    ScheduleName, SenderId, UnixTimestamp, Username,
};
