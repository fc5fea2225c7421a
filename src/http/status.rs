/// Response status code.
///
/// Any code can be written. Codes without a known reason phrase are written
/// with an empty one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    pub fn as_u16(self) -> u16 {
        self.0
    }

    pub fn reason_phrase(self) -> &'static str {
        match self {
            StatusCode::OK => "OK",
            StatusCode::BAD_REQUEST => "Bad Request",
            StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
            _ => "",
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, self.reason_phrase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_reason_phrases() {
        assert_eq!(StatusCode::OK.reason_phrase(), "OK");
        assert_eq!(StatusCode::from(400).reason_phrase(), "Bad Request");
        assert_eq!(StatusCode(500).to_string(), "500 Internal Server Error");
    }

    #[test]
    fn unknown_code_has_empty_reason() {
        assert_eq!(StatusCode(418).reason_phrase(), "");
        assert_eq!(StatusCode(418).as_u16(), 418);
    }
}
