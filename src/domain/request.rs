use crate::domain::validation::ValidationError;
use crate::domain::value::{MessageText, RawPhoneNumber, ScheduleName, SenderId, UnixTimestamp};

/// Most recipients accepted in one batch or scheduled request.
pub const SMS_GROUP_MAX_RECIPIENTS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A message for a single recipient.
pub struct Sms {
    sender: SenderId,
    mobile: RawPhoneNumber,
    message: MessageText,
}

impl Sms {
    pub fn new(sender: SenderId, mobile: RawPhoneNumber, message: MessageText) -> Self {
        Self {
            sender,
            mobile,
            message,
        }
    }

    pub fn sender(&self) -> &SenderId {
        &self.sender
    }

    pub fn mobile(&self) -> &RawPhoneNumber {
        &self.mobile
    }

    pub fn message(&self) -> &MessageText {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One message sent to a list of recipients.
///
/// Invariant: at least one and at most [`SMS_GROUP_MAX_RECIPIENTS`] recipients.
pub struct SmsGroup {
    sender: SenderId,
    mobiles: Vec<RawPhoneNumber>,
    message: MessageText,
}

impl SmsGroup {
    pub fn new(
        sender: SenderId,
        mobiles: Vec<RawPhoneNumber>,
        message: MessageText,
    ) -> Result<Self, ValidationError> {
        if mobiles.is_empty() {
            return Err(ValidationError::Empty {
                field: RawPhoneNumber::FIELD,
            });
        }
        check_recipient_count(mobiles.len())?;
        Ok(Self {
            sender,
            mobiles,
            message,
        })
    }

    /// Append another recipient.
    pub fn add_mobile(&mut self, mobile: RawPhoneNumber) -> Result<(), ValidationError> {
        check_recipient_count(self.mobiles.len() + 1)?;
        self.mobiles.push(mobile);
        Ok(())
    }

    pub fn sender(&self) -> &SenderId {
        &self.sender
    }

    pub fn mobiles(&self) -> &[RawPhoneNumber] {
        &self.mobiles
    }

    pub fn message(&self) -> &MessageText {
        &self.message
    }

    /// Recipients joined with `,` as the gateway expects them.
    pub fn mobile_list_comma_separated(&self) -> String {
        self.mobiles
            .iter()
            .map(RawPhoneNumber::raw)
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn check_recipient_count(actual: usize) -> Result<(), ValidationError> {
    if actual > SMS_GROUP_MAX_RECIPIENTS {
        return Err(ValidationError::TooLong {
            field: RawPhoneNumber::FIELD,
            max: SMS_GROUP_MAX_RECIPIENTS,
            actual,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// When and how a scheduled broadcast goes out.
pub struct ScheduleOptions {
    pub broadcast_time: UnixTimestamp,
    pub name: Option<ScheduleName>,
    /// Ask the gateway to text the account holder once the broadcast has gone out.
    pub notify: bool,
}

impl ScheduleOptions {
    pub fn at(broadcast_time: UnixTimestamp) -> Self {
        Self {
            broadcast_time,
            name: None,
            notify: false,
        }
    }

    pub fn named(mut self, name: ScheduleName) -> Self {
        self.name = Some(name);
        self
    }

    pub fn notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }
}
