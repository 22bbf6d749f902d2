use std::fmt;
use std::str::FromStr;

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BanType {
    Ip,
    Wallet,
}

impl BanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BanType::Ip => "ip",
            BanType::Wallet => "wallet",
        }
    }
}

impl fmt::Display for BanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Invalid ban type. Use 'ip' or 'wallet'")]
pub struct InvalidBanType;

impl FromStr for BanType {
    type Err = InvalidBanType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ip" => Ok(BanType::Ip),
            "wallet" => Ok(BanType::Wallet),
            _ => Err(InvalidBanType),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ban {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "type")]
    pub ban_type: BanType,
    pub value: String,
    pub reason: String,
    #[serde(rename = "bannedAt")]
    pub banned_at: DateTime,
    #[serde(rename = "bannedBy")]
    pub banned_by: String,
}

#[derive(Debug, Clone)]
pub struct NewBan<'a> {
    pub ban_type: BanType,
    pub value: &'a str,
    pub reason: Option<&'a str>,
    pub banned_by: &'a str,
}

impl NewBan<'_> {
    pub fn into_ban(self, banned_at: DateTime) -> Ban {
        let reason = self
            .reason
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .unwrap_or("No reason provided");

        Ban {
            id: None,
            ban_type: self.ban_type,
            value: self.value.to_string(),
            reason: reason.to_string(),
            banned_at,
            banned_by: self.banned_by.to_string(),
        }
    }
}
