use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::Error;

/// Characters a username must not contain.
pub const ILLEGAL_USERNAME_CHARS: [char; 5] = [',', '~', '#', '$', '%'];

/// Maximum username length, in characters.
pub const MAX_USERNAME_CHARS: usize = 255;

/// Validated local account username.
///
/// Guaranteed valid by construction: 1–255 characters, none of
/// [`ILLEGAL_USERNAME_CHARS`]. Unique across all accounts, local and
/// externally-linked alike — uniqueness is enforced by the account store,
/// not here. Use `"u@x.com".parse::<Username>()` or
/// `Username::try_from(string)` to create.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Username {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for Username {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let len = s.chars().count();
        if len == 0 {
            return Err(Error::InvalidUsername("must not be empty".into()));
        }
        if len > MAX_USERNAME_CHARS {
            return Err(Error::InvalidUsername(format!(
                "longer than {MAX_USERNAME_CHARS} characters"
            )));
        }
        if let Some(c) = s.chars().find(|c| ILLEGAL_USERNAME_CHARS.contains(c)) {
            return Err(Error::InvalidUsername(format!(
                "contains illegal character {c:?}"
            )));
        }
        Ok(Self(s))
    }
}

impl From<Username> for String {
    fn from(u: Username) -> Self {
        u.0
    }
}

/// Unique handle binding one external identity to one local account.
///
/// Concatenation of the provider's `sub` and `iss` claims. Immutable once
/// bound to an account; the account store enforces process-wide uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(transparent)]
pub struct LinkageKey(String);

impl LinkageKey {
    /// Build the linkage key from the subject and issuer claims.
    #[must_use]
    pub fn new(subject: &str, issuer: &str) -> Self {
        Self(format!("{subject}{issuer}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Store-assigned local account identifier (ULID format).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, FromStr, From, Into,
)]
#[serde(transparent)]
pub struct AccountId(pub Ulid);

impl AccountId {
    /// Mint a fresh account identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }
}

/// Opaque per-authentication-flow session handle (opaque string).
///
/// Minted by the provider-callback step and carried in the private flow
/// cookie; the consumer chooses the format (ULID, UUID, etc.).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct FlowId(pub String);
