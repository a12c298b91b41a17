//! Escaping for HTML text and attribute values.

use std::fmt;

/// Displays a string with `& < > " '` replaced by character references.
#[derive(Debug, Clone, Copy)]
pub struct Escaped<'a>(pub &'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut last = 0;
        for (idx, c) in self.0.char_indices() {
            let replacement = match c {
                '&' => "&amp;",
                '<' => "&lt;",
                '>' => "&gt;",
                '"' => "&quot;",
                '\'' => "&#39;",
                _ => continue,
            };
            f.write_str(&self.0[last..idx])?;
            f.write_str(replacement)?;
            last = idx + c.len_utf8();
        }
        f.write_str(&self.0[last..])
    }
}
