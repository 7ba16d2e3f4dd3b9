use crate::domain::ResponseCode;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Plain-text reply from a send or schedule call.
pub struct Reply {
    /// Every four-digit number found in the body, in order.
    pub codes: Vec<ResponseCode>,
    pub body: String,
}

impl Reply {
    pub fn contains(&self, code: ResponseCode) -> bool {
        self.codes.contains(&code)
    }

    /// The most telling code in the reply: the first one this crate knows, else the first
    /// one found.
    pub fn primary_code(&self) -> Option<ResponseCode> {
        self.codes
            .iter()
            .copied()
            .find(|code| code.known().is_some())
            .or_else(|| self.codes.first().copied())
    }
}

pub fn decode_reply(body: &str) -> Reply {
    let codes = body
        .split(|c: char| !c.is_ascii_digit())
        .filter(|token| token.len() == 4)
        .filter_map(|token| token.parse::<u16>().ok())
        .map(ResponseCode::new)
        .collect();
    Reply {
        codes,
        body: body.to_owned(),
    }
}
