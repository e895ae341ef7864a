pub mod totp;
pub mod code;

pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MAX_PASSWORD_CHARS: usize = 512;

pub fn password_valid<G>(given: G) -> bool
where
    G: AsRef<str>
{
    let mut char_count = 0;

    for ch in given.as_ref().chars() {
        if ch.is_control() {
            return false;
        }

        char_count += 1;

        if char_count > MAX_PASSWORD_CHARS {
            return false;
        }
    }

    char_count >= MIN_PASSWORD_CHARS
}
