use itertools::Itertools;

// Output records never carry empty strings.
pub const PLACEHOLDER: &str = "-";

pub fn clean_text(s: &str) -> String {
    s.split_whitespace().join(" ")
}

pub fn dash_if_empty(s: &str) -> String {
    let v = clean_text(s);
    match v.is_empty() {
        true => PLACEHOLDER.to_string(),
        false => v,
    }
}
