use super::TransportError;
use crate::domain::{BalanceResponse, LoginResponse};

/// The auth endpoint answers with a bare `true` or `false`.
pub fn decode_login_response(body: &str) -> LoginResponse {
    LoginResponse {
        valid: body.trim().eq_ignore_ascii_case("true"),
        body: body.to_owned(),
    }
}

/// The balance endpoint answers with the remaining credit as a bare decimal, or with an
/// error text.
pub fn decode_balance_response(body: &str) -> Result<BalanceResponse, TransportError> {
    let credit = body.trim();
    match credit.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(BalanceResponse {
            credit: credit.to_owned(),
            body: body.to_owned(),
        }),
        _ => Err(TransportError::InvalidBalance {
            body: body.to_owned(),
        }),
    }
}
