use email_address::EmailAddress;

use crate::validation::check_printable_no_whitespace;

pub const MAX_USERNAME_CHARS: usize = 128;

pub fn username_valid<G>(given: G) -> bool
where
    G: AsRef<str>
{
    let given_ref = given.as_ref();

    !given_ref.is_empty() && check_printable_no_whitespace(given_ref, Some(MAX_USERNAME_CHARS))
}

pub fn email_valid<G>(given: G) -> bool
where
    G: AsRef<str>
{
    EmailAddress::is_valid(given.as_ref())
}
