use crate::domain::{
    MessageText, RawPhoneNumber, ScheduleName, ScheduleOptions, SenderId, Sms, SmsGroup,
    UnixTimestamp,
};
use crate::query::{ComposeError, ParamBag};

const SCHEDULE_FIELD: &str = "schedule";
const SCHEDULE_NOTIFY_FIELD: &str = "schedule_notification";

pub fn encode_send_sms_form(sms: &Sms, params: &mut ParamBag) -> Result<(), ComposeError> {
    push_message(
        params,
        sms.sender(),
        sms.message(),
        sms.mobile().raw().to_owned(),
    )
}

pub fn encode_send_batch_form(group: &SmsGroup, params: &mut ParamBag) -> Result<(), ComposeError> {
    push_message(
        params,
        group.sender(),
        group.message(),
        group.mobile_list_comma_separated(),
    )
}

pub fn encode_schedule_form(
    group: &SmsGroup,
    options: &ScheduleOptions,
    params: &mut ParamBag,
) -> Result<(), ComposeError> {
    encode_send_batch_form(group, params)?;
    params.add(SCHEDULE_FIELD, "1")?;
    params.add(SCHEDULE_NOTIFY_FIELD, if options.notify { "1" } else { "0" })?;
    params.add(
        UnixTimestamp::FIELD,
        options.broadcast_time.value().to_string(),
    )?;
    if let Some(name) = options.name.as_ref() {
        params.add(ScheduleName::FIELD, name.as_str())?;
    }
    Ok(())
}

fn push_message(
    params: &mut ParamBag,
    sender: &SenderId,
    message: &MessageText,
    mobile: String,
) -> Result<(), ComposeError> {
    params
        .add(SenderId::FIELD, sender.as_str())?
        .add(MessageText::FIELD, message.as_str())?
        .add(RawPhoneNumber::FIELD, mobile)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> SmsGroup {
        SmsGroup::new(
            SenderId::new("victor").unwrap(),
            vec![
                RawPhoneNumber::new("2347031234567").unwrap(),
                RawPhoneNumber::new("2347030541644").unwrap(),
            ],
            MessageText::new("This is a group message.").unwrap(),
        )
        .unwrap()
    }

    fn pairs(params: &ParamBag) -> Vec<(&str, &str)> {
        params.pairs().collect()
    }

    #[test]
    fn encode_send_sms_form_params() {
        let sms = Sms::new(
            SenderId::new("victor").unwrap(),
            RawPhoneNumber::new("+2347031234567").unwrap(),
            MessageText::new("This is a test message.").unwrap(),
        );
        let mut params = ParamBag::new();
        encode_send_sms_form(&sms, &mut params).unwrap();

        assert_eq!(
            pairs(&params),
            vec![
                ("sender", "victor"),
                ("message", "This is a test message."),
                ("mobile", "+2347031234567"),
            ]
        );
    }

    #[test]
    fn encode_send_batch_form_joins_recipients() {
        let mut params = ParamBag::new();
        encode_send_batch_form(&group(), &mut params).unwrap();
        assert_eq!(params.get("mobile"), Some("2347031234567,2347030541644"));
        assert_eq!(params.get_all("mobile").len(), 1);
    }

    #[test]
    fn encode_schedule_form_adds_schedule_fields() {
        let options = ScheduleOptions::at(UnixTimestamp::new(1_700_000_000))
            .named(ScheduleName::new("promo").unwrap())
            .notify(true);
        let mut params = ParamBag::new();
        encode_schedule_form(&group(), &options, &mut params).unwrap();

        assert_eq!(
            pairs(&params),
            vec![
                ("sender", "victor"),
                ("message", "This is a group message."),
                ("mobile", "2347031234567,2347030541644"),
                ("schedule", "1"),
                ("schedule_notification", "1"),
                ("broadcast_time", "1700000000"),
                ("schedule_name", "promo"),
            ]
        );
    }

    #[test]
    fn encode_schedule_form_omits_unset_name() {
        let options = ScheduleOptions::at(UnixTimestamp::new(1));
        let mut params = ParamBag::new();
        encode_schedule_form(&group(), &options, &mut params).unwrap();

        assert_eq!(params.get("schedule_notification"), Some("0"));
        assert!(!params.contains("schedule_name"));
    }
}
