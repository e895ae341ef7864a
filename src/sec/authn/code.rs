use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::Rng;

use pea_lib::sec::authn::code::CODE_CHARS;

use crate::error::{Error, ErrorKind};
use crate::sec::authn::totp::constant_time_str_eq;

pub const MAX_ATTEMPTS: u8 = 3;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CodeEntry {
    code: String,
    purpose: String,
    expires_at: Duration,
    attempts: u8,
}

pub fn gen_code<R>(rng: &mut R) -> String
where
    R: Rng
{
    let value = rng.gen_range(0..1_000_000u32);

    format!("{:0width$}", value, width = CODE_CHARS)
}

pub struct CodeManager {
    entries: DashMap<String, CodeEntry>,
}

impl CodeManager {
    pub fn new() -> Self {
        CodeManager {
            entries: DashMap::new(),
        }
    }

    pub fn issue<R>(
        &self,
        username: &str,
        purpose: &str,
        ttl: Duration,
        now: Duration,
        rng: &mut R,
    ) -> String
    where
        R: Rng
    {
        let code = gen_code(rng);

        // one live entry per username. a fresh issuance replaces whatever
        // was pending, regardless of purpose
        self.entries.insert(String::from(username), CodeEntry {
            code: code.clone(),
            purpose: String::from(purpose),
            expires_at: now + ttl,
            attempts: 0,
        });

        code
    }

    // the entry guard is held for the whole sequence so racing attempts
    // cannot both pass the attempt check
    pub fn verify(
        &self,
        username: &str,
        given: &str,
        purpose: &str,
        now: Duration,
    ) -> Result<(), Error> {
        match self.entries.entry(String::from(username)) {
            Entry::Vacant(_) => Err(Error::from(ErrorKind::NoActiveCode)),
            Entry::Occupied(mut occupied) => {
                if now > occupied.get().expires_at {
                    occupied.remove();

                    return Err(Error::from(ErrorKind::CodeExpired));
                }

                if occupied.get().attempts >= MAX_ATTEMPTS {
                    occupied.remove();

                    return Err(Error::from(ErrorKind::AttemptsExceeded));
                }

                let matched = constant_time_str_eq(&occupied.get().code, given)
                    && occupied.get().purpose == purpose;

                if matched {
                    occupied.remove();

                    return Ok(());
                }

                occupied.get_mut().attempts += 1;

                if occupied.get().attempts >= MAX_ATTEMPTS {
                    occupied.remove();

                    return Err(Error::from(ErrorKind::AttemptsExceeded));
                }

                Err(Error::from(ErrorKind::InvalidCode))
            }
        }
    }
}

impl std::default::Default for CodeManager {
    fn default() -> Self {
        CodeManager::new()
    }
}
