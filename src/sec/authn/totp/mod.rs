use std::fmt::Write;
use std::time::Duration;

use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha1::Sha1;
use sha2::{Sha256, Sha512};

pub mod algo;

pub use algo::Algo;

pub const SECRET_LEN: usize = 25;

pub const DEFAULT_DIGITS: u32 = 6;
pub const DEFAULT_STEP: u64 = 30;
pub const DEFAULT_WINDOW: u64 = 1;

pub fn create_secret<R>(rng: &mut R) -> Result<[u8; SECRET_LEN], rand::Error>
where
    R: RngCore
{
    let mut bytes = [0u8; SECRET_LEN];

    rng.try_fill_bytes(&mut bytes)?;

    Ok(bytes)
}

pub fn encode_secret(secret: &[u8]) -> String {
    BASE32_NOPAD.encode(secret)
}

pub fn decode_secret<S>(given: S) -> Result<Vec<u8>, data_encoding::DecodeError>
where
    S: AsRef<str>
{
    BASE32_NOPAD.decode(given.as_ref().as_bytes())
}

#[derive(Debug, Clone)]
pub struct TotpSettings {
    pub algo: Algo,
    pub digits: u32,
    pub step: u64,
    pub window_before: u64,
    pub window_after: u64,
}

impl std::default::Default for TotpSettings {
    fn default() -> Self {
        TotpSettings {
            algo: Algo::SHA1,
            digits: DEFAULT_DIGITS,
            step: DEFAULT_STEP,
            window_before: DEFAULT_WINDOW,
            window_after: DEFAULT_WINDOW,
        }
    }
}

impl TotpSettings {
    pub fn with_window(mut self, steps: u64) -> Self {
        self.window_before = steps;
        self.window_after = steps;
        self
    }
}

fn hmac_digest(algo: &Algo, secret: &[u8], counter: u64) -> Vec<u8> {
    let msg = counter.to_be_bytes();

    match algo {
        Algo::SHA1 => {
            let mut mac = Hmac::<Sha1>::new_from_slice(secret)
                .expect("hmac accepts keys of any length");
            mac.update(&msg);
            mac.finalize().into_bytes().to_vec()
        },
        Algo::SHA256 => {
            let mut mac = Hmac::<Sha256>::new_from_slice(secret)
                .expect("hmac accepts keys of any length");
            mac.update(&msg);
            mac.finalize().into_bytes().to_vec()
        },
        Algo::SHA512 => {
            let mut mac = Hmac::<Sha512>::new_from_slice(secret)
                .expect("hmac accepts keys of any length");
            mac.update(&msg);
            mac.finalize().into_bytes().to_vec()
        }
    }
}

// rfc 4226 dynamic truncation. the modulus is computed in 64 bits since
// up to 12 digit codes are allowed
fn truncate(digest: &[u8], digits: u32) -> String {
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;

    let bin = ((digest[offset] as u64 & 0x7f) << 24)
        | ((digest[offset + 1] as u64) << 16)
        | ((digest[offset + 2] as u64) << 8)
        | (digest[offset + 3] as u64);

    let code = bin % 10u64.pow(digits);

    format!("{:0width$}", code, width = digits as usize)
}

pub fn hotp_code(settings: &TotpSettings, secret: &[u8], counter: u64) -> String {
    truncate(&hmac_digest(&settings.algo, secret, counter), settings.digits)
}

pub fn generate_code(settings: &TotpSettings, secret: &[u8], now: &Duration) -> String {
    hotp_code(settings, secret, now.as_secs() / settings.step)
}

pub fn verify_code<C>(settings: &TotpSettings, secret: &[u8], given: C, now: &Duration) -> bool
where
    C: AsRef<str>
{
    let given_ref = given.as_ref();
    let counter = now.as_secs() / settings.step;

    let start = counter.saturating_sub(settings.window_before);
    let end = counter.saturating_add(settings.window_after);

    let mut matched = false;

    // every candidate counter is checked, no early exit
    for check in start..=end {
        matched |= constant_time_str_eq(&hotp_code(settings, secret, check), given_ref);
    }

    matched
}

pub(crate) fn constant_time_str_eq(expect: &str, given: &str) -> bool {
    let expect = expect.as_bytes();
    let given = given.as_bytes();

    if expect.len() != given.len() {
        return false;
    }

    let mut diff = 0u8;

    for (e, g) in expect.iter().zip(given.iter()) {
        diff |= e ^ g;
    }

    diff == 0
}

pub fn provisioning_uri<L, I>(settings: &TotpSettings, secret: &str, label: L, issuer: I) -> String
where
    L: AsRef<str>,
    I: AsRef<str>,
{
    format!(
        "otpauth://totp/{}?secret={}&issuer={}&algorithm={}&digits={}&period={}",
        percent_encode(label.as_ref()),
        secret,
        percent_encode(issuer.as_ref()),
        settings.algo.as_str(),
        settings.digits,
        settings.step
    )
}

// rfc 3986 unreserved set. authenticator apps expect %20 for spaces, never +
fn percent_encode(given: &str) -> String {
    let mut rtn = String::with_capacity(given.len());

    for byte in given.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                rtn.push(byte as char);
            },
            _ => {
                write!(&mut rtn, "%{:02X}", byte).unwrap();
            }
        }
    }

    rtn
}
