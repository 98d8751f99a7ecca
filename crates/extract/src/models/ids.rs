use crate::consts::STORE_PAGE_URL;
use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Upstream identifier of a store product (a Steam "appid").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TitleId(u32);
impl TitleId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// Public store page for this title. Always available, even when the
    /// store refuses to give us anything else about it.
    pub fn store_url(self) -> String {
        format!("{STORE_PAGE_URL}{}", self.0)
    }
}
impl From<u32> for TitleId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}
impl Display for TitleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}
impl FromStr for TitleId {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(Self).or_raise(|| ErrorKind::ParseError {
            field: "title id",
            value: s.to_string(),
        })
    }
}

/// Verified identifier of the account whose library is being exported
/// (a SteamID64). Only ever lives as long as the request that carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(u64);
impl AccountId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}
impl From<u64> for AccountId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}
impl Display for AccountId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}
impl FromStr for AccountId {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self).or_raise(|| ErrorKind::ParseError {
            field: "account id",
            value: s.to_string(),
        })
    }
}
