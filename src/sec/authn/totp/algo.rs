use std::str::FromStr;

use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algo {
    SHA1,
    SHA256,
    SHA512,
}

impl Algo {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algo::SHA1 => "SHA1",
            Algo::SHA256 => "SHA256",
            Algo::SHA512 => "SHA512",
        }
    }
}

impl std::default::Default for Algo {
    fn default() -> Self {
        Algo::SHA1
    }
}

impl std::fmt::Display for Algo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct FromStrError;

impl FromStr for Algo {
    type Err = FromStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SHA1" => Ok(Algo::SHA1),
            "SHA256" => Ok(Algo::SHA256),
            "SHA512" => Ok(Algo::SHA512),
            _ => Err(FromStrError),
        }
    }
}

impl TryFrom<&str> for Algo {
    type Error = FromStrError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::from_str(s)
    }
}

impl TryFrom<String> for Algo {
    type Error = FromStrError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_str(&s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_round_trip() {
        for name in ["SHA1", "SHA256", "SHA512"] {
            let algo: Algo = name.parse().expect("known algorithm");

            assert_eq!(algo.as_str(), name);
        }

        assert!(Algo::from_str("MD5").is_err());
        assert!(Algo::from_str("sha1").is_err());
    }
}
