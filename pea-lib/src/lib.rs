pub mod validation;
pub mod users;
pub mod sec;

pub fn string_to_len_char(length: usize, ch: char) -> String {
    std::iter::repeat(ch).take(length).collect()
}

pub fn string_to_len(length: usize) -> String {
    string_to_len_char(length, 'a')
}
