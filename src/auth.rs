//! Bearer-token roles guarding the admin routes.

use crate::models::BracketError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Moderator,
    User,
}

impl Role {
    /// Admins and moderators may generate, update and delete brackets.
    pub fn can_manage_brackets(self) -> bool {
        matches!(self, Role::Admin | Role::Moderator)
    }
}

impl FromStr for Role {
    type Err = BracketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "moderator" => Ok(Role::Moderator),
            "user" => Ok(Role::User),
            other => Err(BracketError::Validation(format!("unknown role: {other}"))),
        }
    }
}

/// Known API tokens and the role each one carries.
#[derive(Clone, Debug, Default)]
pub struct ApiTokens {
    tokens: HashMap<String, Role>,
}

impl ApiTokens {
    /// Parse `token:role` pairs separated by commas. Malformed entries are skipped with a warning.
    pub fn parse(raw: &str) -> Self {
        let mut tokens = Self::default();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let parsed = entry
                .rsplit_once(':')
                .filter(|(token, _)| !token.is_empty())
                .and_then(|(token, role)| role.parse::<Role>().ok().map(|r| (token, r)));
            match parsed {
                Some((token, role)) => tokens.insert(token, role),
                None => log::warn!("Ignoring malformed API token entry"),
            }
        }
        tokens
    }

    pub fn insert(&mut self, token: impl Into<String>, role: Role) {
        self.tokens.insert(token.into(), role);
    }

    pub fn role_for(&self, token: &str) -> Option<Role> {
        self.tokens.get(token).copied()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Check an `Authorization` header value for bracket management rights.
///
/// Missing or unknown token: `Unauthorized`. Known token without the right role: `Forbidden`.
pub fn authorize_bracket_admin(
    tokens: &ApiTokens,
    authorization: Option<&str>,
) -> Result<Role, BracketError> {
    let token = authorization
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(BracketError::Unauthorized)?;
    let role = tokens.role_for(token).ok_or(BracketError::Unauthorized)?;
    if !role.can_manage_brackets() {
        return Err(BracketError::Forbidden);
    }
    Ok(role)
}
