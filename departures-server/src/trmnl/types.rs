//! Device platform response DTOs.

use std::fmt;

use serde::Deserialize;

/// Response from the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub scope: Option<String>,
}

/// Response from `GET account`.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: AccountId,
}

/// Account ids arrive as either JSON numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AccountId {
    Number(i64),
    Text(String),
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountId::Number(n) => write!(f, "{n}"),
            AccountId::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_text_ids() {
        let acct: Account = serde_json::from_str(r#"{"id": 1234, "name": "x"}"#).unwrap();
        assert_eq!(acct.id, AccountId::Number(1234));
        assert_eq!(acct.id.to_string(), "1234");

        let acct: Account = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(acct.id.to_string(), "abc");
    }

    #[test]
    fn token_response_minimal() {
        let token: TokenResponse = serde_json::from_str(r#"{"access_token": "t"}"#).unwrap();
        assert_eq!(token.access_token, "t");
        assert_eq!(token.token_type, None);
    }
}
