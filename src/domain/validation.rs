use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    TooLong { field: &'static str, max: usize, actual: usize },
    InvalidCharacters { field: &'static str, input: String },
    InvalidPhoneNumber { input: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::TooLong { field, max, actual } => {
                write!(f, "{field} is too long: {actual} characters (max {max})")
            }
            Self::InvalidCharacters { field, input } => {
                write!(f, "{field} contains invalid characters: {input}")
            }
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::ValidationError;

    #[test]
    fn display_messages_are_human_readable() {
        let err = ValidationError::Empty { field: "mobile" };
        assert_eq!(err.to_string(), "mobile must not be empty");

        let err = ValidationError::TooLong {
            field: "schedule_name",
            max: 16,
            actual: 20,
        };
        assert_eq!(
            err.to_string(),
            "schedule_name is too long: 20 characters (max 16)"
        );

        let err = ValidationError::InvalidCharacters {
            field: "sender",
            input: "a b".to_owned(),
        };
        assert_eq!(err.to_string(), "sender contains invalid characters: a b");

        let err = ValidationError::InvalidPhoneNumber {
            input: "bad".to_owned(),
        };
        assert_eq!(err.to_string(), "invalid phone number: bad");
    }
}
