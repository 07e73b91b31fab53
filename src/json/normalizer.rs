/// Wraps a bare JSON value in an array so single-argument calls may omit brackets.
///
/// Surrounding whitespace is trimmed; text already starting with `[` is returned as is.
/// Well-formedness is not checked here.
pub fn normalize(s: &str) -> String {
    let s = s.trim();
    if s.starts_with('[') {
        return s.to_string();
    }
    format!("[{s}]")
}
