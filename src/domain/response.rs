use crate::domain::value::ResponseCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    /// Whether the gateway accepted the credentials.
    pub valid: bool,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceResponse {
    /// Remaining credit, as the decimal the gateway returned.
    pub credit: String,
    pub body: String,
}

impl BalanceResponse {
    /// Credit as a float. The textual form stays in [`BalanceResponse::credit`].
    pub fn credit_f64(&self) -> f64 {
        self.credit.parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Accepted send or schedule request.
pub struct SendResponse {
    pub code: ResponseCode,
    pub body: String,
}
