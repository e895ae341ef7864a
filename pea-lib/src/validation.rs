pub fn check_printable<G>(
    given: G,
    max_chars: Option<usize>
) -> bool
where
    G: AsRef<str>
{
    let mut char_count = 0;

    for ch in given.as_ref().chars() {
        if ch.is_control() {
            return false;
        }

        char_count += 1;

        if let Some(max_chars) = max_chars {
            if char_count > max_chars {
                return false;
            }
        }
    }

    true
}

pub fn check_printable_no_whitespace<G>(
    given: G,
    max_chars: Option<usize>
) -> bool
where
    G: AsRef<str>
{
    let mut char_count = 0;

    for ch in given.as_ref().chars() {
        if ch.is_control() || ch.is_whitespace() {
            return false;
        }

        char_count += 1;

        if let Some(max_chars) = max_chars {
            if char_count > max_chars {
                return false;
            }
        }
    }

    true
}

pub fn check_ascii_digits<G>(given: G, total_chars: usize) -> bool
where
    G: AsRef<str>
{
    let given_ref = given.as_ref();

    given_ref.len() == total_chars && given_ref.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    pub fn check_printable_control_chars() {
        let leading = String::from("\u{0000}test");
        let trailing = String::from("test\u{0000}");
        let contains = String::from("test\u{001b}test");

        assert!(!check_printable(leading, None), "leading control characters");
        assert!(!check_printable(trailing, None), "trailing control characters");
        assert!(!check_printable(contains, None), "contains control characters");
    }

    #[test]
    pub fn check_printable_max_length() {
        let k = String::from("abcdefghijklmnopqrstuvwxyzA");
        let count = k.chars().count();
        let max = count - 1;

        assert!(!check_printable(&k, Some(max)), "max {} total {}", max, count);
        assert!(check_printable(&k, Some(count)), "max {} total {}", count, count);
    }

    #[test]
    pub fn check_printable_no_whitespace_chars() {
        let leading = String::from(" test");
        let trailing = String::from("test ");
        let contains = String::from("test test");

        assert!(!check_printable_no_whitespace(leading, None), "leading whitespace characters");
        assert!(!check_printable_no_whitespace(trailing, None), "trailing whitespace characters");
        assert!(!check_printable_no_whitespace(contains, None), "contains whitespace characters");
    }

    #[test]
    pub fn check_ascii_digits_format() {
        let valid = vec![
            String::from("000000"),
            String::from("493027"),
        ];

        for test in valid {
            assert!(check_ascii_digits(&test, 6), "valid string failed {:?}", test);
        }

        let invalid = vec![
            String::new(),
            String::from("12345"),
            String::from("1234567"),
            String::from("12345a"),
            String::from("\u{ff11}\u{ff12}\u{ff13}\u{ff14}\u{ff15}\u{ff16}"),
        ];

        for test in invalid {
            assert!(!check_ascii_digits(&test, 6), "invalid string failed {:?}", test);
        }
    }
}
