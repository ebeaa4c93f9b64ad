//! Gateway status codes
//!
//! Tunnel and client errors carry a numeric status code. The mapping to a
//! symbolic category is total: codes this client does not know are rendered
//! as their number.

use std::fmt;

/// Numeric status code reported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const SUCCESS: StatusCode = StatusCode(0x0000);
    pub const UNSUPPORTED: StatusCode = StatusCode(0x0100);
    pub const SERVER_ERROR: StatusCode = StatusCode(0x0200);
    pub const SERVER_BUSY: StatusCode = StatusCode(0x0201);
    pub const UPSTREAM_TIMEOUT: StatusCode = StatusCode(0x0202);
    pub const UPSTREAM_ERROR: StatusCode = StatusCode(0x0203);
    pub const RESOURCE_NOT_FOUND: StatusCode = StatusCode(0x0204);
    pub const RESOURCE_CONFLICT: StatusCode = StatusCode(0x0205);
    pub const CLIENT_BAD_REQUEST: StatusCode = StatusCode(0x0300);
    pub const CLIENT_UNAUTHORIZED: StatusCode = StatusCode(0x0301);
    pub const CLIENT_FORBIDDEN: StatusCode = StatusCode(0x0303);
    pub const CLIENT_TIMEOUT: StatusCode = StatusCode(0x0308);
    pub const CLIENT_OVERRUN: StatusCode = StatusCode(0x030D);
    pub const CLIENT_BAD_TYPE: StatusCode = StatusCode(0x030F);
    pub const CLIENT_TOO_MANY: StatusCode = StatusCode(0x031D);

    /// Create a status code
    pub fn new(code: u16) -> Self {
        Self(code)
    }

    /// Raw numeric value
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Symbolic category, if the code is known
    pub fn name(&self) -> Option<&'static str> {
        let name = match *self {
            Self::SUCCESS => "SUCCESS",
            Self::UNSUPPORTED => "UNSUPPORTED",
            Self::SERVER_ERROR => "SERVER_ERROR",
            Self::SERVER_BUSY => "SERVER_BUSY",
            Self::UPSTREAM_TIMEOUT => "UPSTREAM_TIMEOUT",
            Self::UPSTREAM_ERROR => "UPSTREAM_ERROR",
            Self::RESOURCE_NOT_FOUND => "RESOURCE_NOT_FOUND",
            Self::RESOURCE_CONFLICT => "RESOURCE_CONFLICT",
            Self::CLIENT_BAD_REQUEST => "CLIENT_BAD_REQUEST",
            Self::CLIENT_UNAUTHORIZED => "CLIENT_UNAUTHORIZED",
            Self::CLIENT_FORBIDDEN => "CLIENT_FORBIDDEN",
            Self::CLIENT_TIMEOUT => "CLIENT_TIMEOUT",
            Self::CLIENT_OVERRUN => "CLIENT_OVERRUN",
            Self::CLIENT_BAD_TYPE => "CLIENT_BAD_TYPE",
            Self::CLIENT_TOO_MANY => "CLIENT_TOO_MANY",
            _ => return None,
        };
        Some(name)
    }

    /// Whether the code reports success
    pub fn is_success(&self) -> bool {
        *self == Self::SUCCESS
    }

    /// Parse the wire representation
    pub fn parse(value: &str) -> Option<Self> {
        value.parse().ok().map(Self)
    }
}

/// Category name, or the number for unknown codes
impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        let table = [
            (0, "SUCCESS"),
            (256, "UNSUPPORTED"),
            (512, "SERVER_ERROR"),
            (513, "SERVER_BUSY"),
            (514, "UPSTREAM_TIMEOUT"),
            (515, "UPSTREAM_ERROR"),
            (516, "RESOURCE_NOT_FOUND"),
            (517, "RESOURCE_CONFLICT"),
            (768, "CLIENT_BAD_REQUEST"),
            (769, "CLIENT_UNAUTHORIZED"),
            (771, "CLIENT_FORBIDDEN"),
            (776, "CLIENT_TIMEOUT"),
            (781, "CLIENT_OVERRUN"),
            (783, "CLIENT_BAD_TYPE"),
            (797, "CLIENT_TOO_MANY"),
        ];
        for (code, name) in table {
            assert_eq!(StatusCode::new(code).to_string(), name);
        }
    }

    #[test]
    fn test_unknown_code_renders_number() {
        assert_eq!(StatusCode::new(770).to_string(), "770");
        assert_eq!(StatusCode::new(1).name(), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!(StatusCode::parse("519"), Some(StatusCode(519)));
        assert_eq!(StatusCode::parse("nope"), None);
        assert!(StatusCode::parse("0").unwrap().is_success());
    }
}
