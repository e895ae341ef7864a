use crate::validation::{check_ascii_digits, check_printable_no_whitespace};

pub const CODE_CHARS: usize = 6;
pub const MAX_PURPOSE_CHARS: usize = 64;

pub fn code_valid<G>(given: G) -> bool
where
    G: AsRef<str>
{
    check_ascii_digits(given, CODE_CHARS)
}

pub fn purpose_valid<G>(given: G) -> bool
where
    G: AsRef<str>
{
    let given_ref = given.as_ref();

    !given_ref.is_empty() && check_printable_no_whitespace(given_ref, Some(MAX_PURPOSE_CHARS))
}
