use crate::validation::{check_text, TextIssue};

pub const MAX_GROUP_NAME_CHARS: usize = 255;

pub fn name_check(given: &str) -> Result<(), TextIssue> {
    check_text(given, MAX_GROUP_NAME_CHARS)
}

pub fn name_valid(given: &str) -> bool {
    name_check(given).is_ok()
}
