//! Small utility helpers used across modules.

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge response payloads. Cuts on a char boundary.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}

/// Parse a 1-based menu choice typed by the user into a 0-based index.
/// Returns None for blank input, non-numbers and out-of-range choices.
pub fn parse_choice(input: &str, count: usize) -> Option<usize> {
  let n: usize = input.trim().parse().ok()?;
  (1..=count).contains(&n).then(|| n - 1)
}
