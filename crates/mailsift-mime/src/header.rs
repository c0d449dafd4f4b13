//! MIME header block parsing.

/// Header fields of one part, in the order they appeared.
///
/// Names compare case-insensitively; values are unfolded but otherwise raw
/// (encoded words are left for the caller to decode).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// First value of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values of a field.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields were present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Parses the header block at the start of `raw`.
    ///
    /// Returns the headers and the offset where the body begins. The block
    /// ends at the first empty line, or at the first line that is neither a
    /// field nor a continuation (in which case that line starts the body).
    #[must_use]
    pub fn parse(raw: &[u8]) -> (Self, usize) {
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;
        let mut offset = 0;

        while offset < raw.len() {
            let (line, next) = next_line(raw, offset);

            if line.is_empty() {
                offset = next;
                break;
            }

            if matches!(line[0], b' ' | b'\t') {
                if let Some((_, value)) = current.as_mut() {
                    let folded = String::from_utf8_lossy(line);
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(folded.trim());
                    offset = next;
                    continue;
                }
                break;
            }

            let Some(colon) = line.iter().position(|&b| b == b':') else {
                break;
            };
            let name = &line[..colon];
            if name.is_empty() || !name.iter().all(|b| b.is_ascii_graphic()) {
                break;
            }

            if let Some((n, v)) = current.take() {
                headers.add(n, v);
            }
            let value = String::from_utf8_lossy(&line[colon + 1..]).trim().to_string();
            current = Some((String::from_utf8_lossy(name).into_owned(), value));
            offset = next;
        }

        if let Some((n, v)) = current {
            headers.add(n, v);
        }
        (headers, offset.min(raw.len()))
    }
}

/// Returns the line starting at `start` without its terminator, and the
/// offset just past the terminator. Accepts both CRLF and bare LF.
pub(crate) fn next_line(raw: &[u8], start: usize) -> (&[u8], usize) {
    let rest = &raw[start..];
    match rest.iter().position(|&b| b == b'\n') {
        Some(nl) => {
            let line = &rest[..nl];
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            (line, start + nl + 1)
        }
        None => (rest, raw.len()),
    }
}
