use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::error::{Detail, Error, ErrorKind};
use crate::store::CredentialStore;
use crate::time::{self, Clock, SystemClock};
use crate::user::UserRecord;

pub mod password;
pub mod totp;
pub mod code;

use code::CodeManager;
use totp::TotpSettings;

pub const DEFAULT_ISSUER: &str = "Pretty Evil Auth";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Complete,
    SecondFactorRequired,
}

pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    codes: CodeManager,
    totp: TotpSettings,
    issuer: String,
    user_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("totp", &self.totp)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Authenticator {
            store,
            clock: Arc::new(SystemClock),
            codes: CodeManager::new(),
            totp: TotpSettings::default(),
            issuer: String::from(DEFAULT_ISSUER),
            user_locks: DashMap::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_issuer<I>(mut self, issuer: I) -> Self
    where
        I: Into<String>
    {
        self.issuer = issuer.into();
        self
    }

    pub fn with_totp_settings(mut self, settings: TotpSettings) -> Result<Self, Error> {
        if !pea_lib::sec::authn::totp::digits_valid(&settings.digits)
            || !pea_lib::sec::authn::totp::step_valid(&settings.step)
        {
            return Err(Error::from(ErrorKind::ValidationFailed)
                .with_detail(Detail::with_key("totp_settings")));
        }

        self.totp = settings;

        Ok(self)
    }

    // read-modify-write on one user's record serializes on this lock.
    // distinct usernames never contend
    fn user_lock(&self, username: &str) -> Arc<Mutex<()>> {
        self.user_locks
            .entry(String::from(username))
            .or_default()
            .clone()
    }

    fn created_at(&self) -> Result<DateTime<Utc>, Error> {
        time::utc_to_chrono_datetime(&self.clock.now())
            .ok_or_else(|| Error::from((
                ErrorKind::InternalFailure,
                "clock produced an out of range timestamp"
            )))
    }

    pub fn register(&self, username: &str, email: &str, password: &str) -> Result<(), Error> {
        let mut invalid = Vec::new();

        if !pea_lib::users::username_valid(username) {
            invalid.push(String::from("username"));
        }

        if !pea_lib::users::email_valid(email) {
            invalid.push(String::from("email"));
        }

        if !pea_lib::sec::authn::password_valid(password) {
            invalid.push(String::from("password"));
        }

        if !invalid.is_empty() {
            return Err(Error::from(ErrorKind::ValidationFailed)
                .with_detail(Detail::Keys(invalid)));
        }

        // hashing is the expensive part and happens before any lock is taken
        let hash = password::gen_hash(password, &mut rand::thread_rng())?;
        let created_at = self.created_at()?;

        let lock = self.user_lock(username);
        let _guard = lock.lock()
            .map_err(|_| Error::from((ErrorKind::InternalFailure, "user lock poisoned")))?;

        if self.store.exists(username)? {
            return Err(Error::from(ErrorKind::DuplicateUser));
        }

        self.store.put(username, UserRecord::create(username, email, hash, created_at))?;

        tracing::info!(username, "user registered");

        Ok(())
    }

    pub fn authenticate_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(AuthStatus, UserRecord), Error> {
        let Some(record) = self.store.get(username)? else {
            // indistinguishable from a wrong password
            return Err(Error::from(ErrorKind::InvalidCredentials));
        };

        let matched = password::verify_hash(password, &record.password_hash)
            .map_err(|err| match err {
                password::PasswordError::Argon2(src) => {
                    Error::from((ErrorKind::ValidationFailed, "stored password hash is malformed"))
                        .with_detail(Detail::with_key("password_hash"))
                        .with_source(src)
                },
                other => Error::from(other),
            })?;

        if !matched {
            return Err(Error::from(ErrorKind::InvalidCredentials));
        }

        if record.two_factor_enabled {
            Ok((AuthStatus::SecondFactorRequired, record))
        } else {
            Ok((AuthStatus::Complete, record))
        }
    }

    pub fn setup_two_factor(&self, username: &str) -> Result<String, Error> {
        let lock = self.user_lock(username);
        let _guard = lock.lock()
            .map_err(|_| Error::from((ErrorKind::InternalFailure, "user lock poisoned")))?;

        let Some(mut record) = self.store.get(username)? else {
            return Err(Error::from(ErrorKind::UserNotFound));
        };

        let secret = totp::create_secret(&mut rand::thread_rng())
            .map_err(|err| Error::from(ErrorKind::InternalFailure).with_source(err))?;
        let encoded = totp::encode_secret(&secret);

        let uri = totp::provisioning_uri(&self.totp, &encoded, &record.email, &self.issuer);

        // the fresh secret is unconfirmed no matter what state the account
        // was in. enabling requires a successful code check
        record.totp_secret = Some(encoded);
        record.two_factor_enabled = false;

        self.store.put(username, record)?;

        tracing::info!(username, "totp enrollment started");

        Ok(uri)
    }

    pub fn enable_two_factor(&self, username: &str, code: &str) -> Result<(), Error> {
        let lock = self.user_lock(username);
        let _guard = lock.lock()
            .map_err(|_| Error::from((ErrorKind::InternalFailure, "user lock poisoned")))?;

        let Some(mut record) = self.store.get(username)? else {
            return Err(Error::from(ErrorKind::UserNotFound));
        };

        self.check_totp(&record, code)?;

        record.two_factor_enabled = true;

        self.store.put(username, record)?;

        tracing::info!(username, "totp second factor enabled");

        Ok(())
    }

    pub fn verify_two_factor_code(&self, username: &str, code: &str) -> Result<(), Error> {
        let Some(record) = self.store.get(username)? else {
            return Err(Error::from(ErrorKind::UserNotFound));
        };

        self.check_totp(&record, code)
    }

    pub fn complete_login(
        &self,
        username: &str,
        password: &str,
        totp_code: Option<&str>,
    ) -> Result<UserRecord, Error> {
        let (status, record) = self.authenticate_password(username, password)?;

        match status {
            AuthStatus::Complete => Ok(record),
            AuthStatus::SecondFactorRequired => {
                let Some(code) = totp_code else {
                    return Err(Error::from(ErrorKind::SecondFactorCodeMissing));
                };

                self.check_totp(&record, code)?;

                Ok(record)
            }
        }
    }

    fn check_totp(&self, record: &UserRecord, code: &str) -> Result<(), Error> {
        let Some(encoded) = record.totp_secret.as_ref() else {
            return Err(Error::from(ErrorKind::TotpNotConfigured));
        };

        let secret = totp::decode_secret(encoded).map_err(|err| {
            Error::from((ErrorKind::ValidationFailed, "stored totp secret is not valid base32"))
                .with_detail(Detail::with_key("totp_secret"))
                .with_source(err)
        })?;

        if totp::verify_code(&self.totp, &secret, code, &self.clock.now()) {
            Ok(())
        } else {
            Err(Error::from(ErrorKind::InvalidCode))
        }
    }

    pub fn issue_verification_code(
        &self,
        username: &str,
        purpose: &str,
        ttl: Option<Duration>,
    ) -> Result<String, Error> {
        if !pea_lib::sec::authn::code::purpose_valid(purpose) {
            return Err(Error::from(ErrorKind::ValidationFailed)
                .with_detail(Detail::with_key("purpose")));
        }

        if !self.store.exists(username)? {
            return Err(Error::from(ErrorKind::UserNotFound));
        }

        let code = self.codes.issue(
            username,
            purpose,
            ttl.unwrap_or(code::DEFAULT_TTL),
            self.clock.now(),
            &mut rand::thread_rng(),
        );

        tracing::debug!(username, purpose, "verification code issued");

        Ok(code)
    }

    pub fn verify_code(&self, username: &str, code: &str, purpose: &str) -> Result<(), Error> {
        self.codes.verify(username, code, purpose, self.clock.now())
    }

    pub fn get_user(&self, username: &str) -> Result<Option<UserRecord>, Error> {
        Ok(self.store.get(username)?)
    }

    pub fn list_usernames(&self) -> Result<Vec<String>, Error> {
        Ok(self.store.list()?)
    }
}
