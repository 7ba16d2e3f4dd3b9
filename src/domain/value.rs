use crate::domain::validation::ValidationError;

use phonenumber::country;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// BBN account username, usually an email address.
///
/// Invariant: non-empty after trimming.
pub struct Username(String);

impl Username {
    /// Parameter name used by the gateway (`username`).
    pub const FIELD: &'static str = "username";

    /// Create a validated [`Username`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated username.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// BBN account password.
///
/// Invariant: must not be empty (whitespace is preserved and allowed).
pub struct Password(String);

impl Password {
    /// Parameter name used by the gateway (`password`).
    pub const FIELD: &'static str = "password";

    /// Create a validated [`Password`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the password as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Sender id shown to recipients (`sender`).
///
/// Invariant: either up to 14 digits, or up to 11 ASCII alphanumeric characters.
pub struct SenderId(String);

impl SenderId {
    /// Parameter name used by the gateway (`sender`).
    pub const FIELD: &'static str = "sender";

    /// Longest numeric sender id.
    pub const MAX_NUMERIC_LEN: usize = 14;
    /// Longest alphanumeric sender id.
    pub const MAX_ALPHANUMERIC_LEN: usize = 11;

    /// Create a validated [`SenderId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::InvalidCharacters {
                field: Self::FIELD,
                input: trimmed.to_owned(),
            });
        }

        let max = if trimmed.chars().all(|c| c.is_ascii_digit()) {
            Self::MAX_NUMERIC_LEN
        } else {
            Self::MAX_ALPHANUMERIC_LEN
        };
        if trimmed.len() > max {
            return Err(ValidationError::TooLong {
                field: Self::FIELD,
                max,
                actual: trimmed.len(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated sender id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMS message text (`message`).
///
/// Invariant: non-empty after trimming. The original value (including whitespace) is preserved.
pub struct MessageText(String);

impl MessageText {
    /// Parameter name used by the gateway (`message`).
    pub const FIELD: &'static str = "message";

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the message text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Name that identifies a scheduled broadcast (`schedule_name`).
///
/// Invariant: 1 to 16 ASCII alphanumeric characters.
pub struct ScheduleName(String);

impl ScheduleName {
    /// Parameter name used by the gateway (`schedule_name`).
    pub const FIELD: &'static str = "schedule_name";

    pub const MAX_LEN: usize = 16;

    /// Create a validated [`ScheduleName`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::InvalidCharacters {
                field: Self::FIELD,
                input: trimmed.to_owned(),
            });
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(ValidationError::TooLong {
                field: Self::FIELD,
                max: Self::MAX_LEN,
                actual: trimmed.len(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated schedule name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Unvalidated recipient number as sent to the gateway (`mobile`).
///
/// Invariant: non-empty after trimming. This type does not normalize; if you want E.164
/// normalization, parse into [`PhoneNumber`] and convert it into [`RawPhoneNumber`].
pub struct RawPhoneNumber(String);

impl RawPhoneNumber {
    /// Parameter name used by the gateway (`mobile`).
    pub const FIELD: &'static str = "mobile";

    /// Create a validated (non-empty) raw phone number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Raw (trimmed) value as sent to the gateway.
    pub fn raw(&self) -> &str {
        &self.0
    }
}

impl From<PhoneNumber> for RawPhoneNumber {
    /// Convert an already-parsed phone number to a normalized raw value (E.164).
    fn from(value: PhoneNumber) -> Self {
        Self(value.e164)
    }
}

#[derive(Debug, Clone)]
/// Parsed phone number with an E.164 representation.
///
/// Equality, ordering, and hashing are based on the E.164 form.
pub struct PhoneNumber {
    raw: String,
    e164: String,
    parsed: phonenumber::PhoneNumber,
}

impl PhoneNumber {
    /// Parameter name used by the gateway (`mobile`).
    pub const FIELD: &'static str = "mobile";

    /// Parse and normalize a phone number into E.164.
    ///
    /// `default_region` is used when the input does not contain an explicit country prefix.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let parsed = phonenumber::parse(default_region, &raw)
            .map_err(|_| ValidationError::InvalidPhoneNumber { input: raw.clone() })?;

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Ok(Self { raw, e164, parsed })
    }

    /// Raw input after trimming.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized E.164 representation.
    pub fn e164(&self) -> &str {
        &self.e164
    }

    /// The parsed phone number from the `phonenumber` crate.
    pub fn parsed(&self) -> &phonenumber::PhoneNumber {
        &self.parsed
    }
}

impl PartialEq for PhoneNumber {
    fn eq(&self, other: &Self) -> bool {
        self.e164 == other.e164
    }
}

impl Eq for PhoneNumber {}

impl std::hash::Hash for PhoneNumber {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.e164.hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Unix timestamp in seconds (`broadcast_time`).
///
/// The gateway interprets scheduled times in WAT (GMT+1).
pub struct UnixTimestamp(u64);

impl UnixTimestamp {
    /// Parameter name used by the gateway (`broadcast_time`).
    pub const FIELD: &'static str = "broadcast_time";

    /// Create a timestamp value (no range validation is performed).
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the underlying timestamp in seconds.
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Gateway response code.
///
/// This value is preserved as-is even when the code is unknown to this crate.
pub struct ResponseCode(u16);

impl ResponseCode {
    /// Construct a response code from its integer representation.
    pub fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the integer code as returned by the gateway.
    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// Map this code to a known response code variant, if one exists.
    pub fn known(self) -> Option<KnownResponseCode> {
        KnownResponseCode::from_code(self.0)
    }

    /// Returns `true` if the gateway accepted the request (message sent or schedule saved).
    pub fn is_success(self) -> bool {
        matches!(
            self.known(),
            Some(KnownResponseCode::MessageSent | KnownResponseCode::ScheduleSaved)
        )
    }

    /// Returns `true` if this code represents rejected credentials.
    pub fn is_auth_error(self) -> bool {
        matches!(
            self.known(),
            Some(KnownResponseCode::InvalidUsername | KnownResponseCode::IncorrectPassword)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Response codes documented by the gateway.
pub enum KnownResponseCode {
    RequestTimeout,
    MessageSent,
    InvalidUsername,
    IncorrectPassword,
    InsufficientCredit,
    InvalidUrlSubmission,
    InvalidMobile,
    InvalidSenderId,
    MessageTooLong,
    EmptyMessage,
    ScheduleSaved,
    BroadcastTimeInPast,
    InvalidBroadcastTime,
    ScheduleNameTooLong,
    InvalidNotifyValue,
    IncorrectScheduleName,
}

impl KnownResponseCode {
    const TABLE: [(KnownResponseCode, u16, &'static str); 16] = [
        (Self::RequestTimeout, 1800, "Request timeout."),
        (Self::MessageSent, 1801, "Message successfully sent."),
        (Self::InvalidUsername, 1802, "Invalid username."),
        (Self::IncorrectPassword, 1803, "Incorrect password."),
        (Self::InsufficientCredit, 1804, "Insufficient credit."),
        (Self::InvalidUrlSubmission, 1805, "Invalid URL submission."),
        (Self::InvalidMobile, 1806, "Invalid mobile."),
        (Self::InvalidSenderId, 1807, "Invalid sender id."),
        (Self::MessageTooLong, 1808, "Message too long."),
        (Self::EmptyMessage, 1809, "Empty message."),
        (Self::ScheduleSaved, 1901, "Schedule was successfully saved."),
        (
            Self::BroadcastTimeInPast,
            1902,
            "Scheduled broadcast time cannot be earlier than current time.",
        ),
        (Self::InvalidBroadcastTime, 1903, "Invalid broadcast time."),
        (
            Self::ScheduleNameTooLong,
            1904,
            "Schedule name is too long. Maximum of 16 alphanumeric characters allowed.",
        ),
        (
            Self::InvalidNotifyValue,
            1905,
            "Invalid value for notify me. 0 or 1 expected.",
        ),
        (
            Self::IncorrectScheduleName,
            1906,
            "Incorrect schedule name. Schedule name may contain special character.",
        ),
    ];

    /// Map a raw code to a known variant, if this crate knows it.
    pub fn from_code(code: u16) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(_, value, _)| *value == code)
            .map(|(kind, _, _)| *kind)
    }

    /// Numeric code returned by the gateway.
    pub fn code(self) -> u16 {
        self.entry().1
    }

    /// Human-readable description published by the gateway.
    pub fn message(self) -> &'static str {
        self.entry().2
    }

    fn entry(self) -> (KnownResponseCode, u16, &'static str) {
        Self::TABLE
            .iter()
            .copied()
            .find(|(kind, _, _)| *kind == self)
            .unwrap_or((self, 0, ""))
    }
}

impl From<KnownResponseCode> for ResponseCode {
    fn from(value: KnownResponseCode) -> Self {
        Self(value.code())
    }
}
