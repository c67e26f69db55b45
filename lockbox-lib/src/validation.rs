#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TextIssue {
    Empty,
    TooLong,
    Control,
}

/// checks free form text that is shown back to users
///
/// whitespace is allowed anywhere but the text must not be blank, must not
/// contain control characters and must fit in `max_chars` characters.
/// the first issue found is returned
pub fn check_text<G>(given: G, max_chars: usize) -> Result<(), TextIssue>
where
    G: AsRef<str>
{
    let given_ref = given.as_ref();

    if given_ref.trim().is_empty() {
        return Err(TextIssue::Empty);
    }

    let mut char_count = 0;
    let mut too_long = false;

    for ch in given_ref.chars() {
        if ch.is_control() {
            return Err(TextIssue::Control);
        }

        char_count += 1;

        if char_count > max_chars {
            too_long = true;
        }
    }

    if too_long {
        Err(TextIssue::TooLong)
    } else {
        Ok(())
    }
}
