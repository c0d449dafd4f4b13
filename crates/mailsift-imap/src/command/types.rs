//! Command argument types.

/// Search criteria for the SEARCH command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriteria {
    /// Every message.
    All,
    /// Messages without `\Seen`.
    Unseen,
    /// Messages with `\Seen`.
    Seen,
    /// Subject contains the string.
    Subject(String),
    /// From contains the string.
    From(String),
    /// All of the criteria match.
    And(Vec<Self>),
    /// Negation.
    Not(Box<Self>),
}

/// A single FETCH data item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchAttribute {
    /// `UID`
    Uid,
    /// `FLAGS`
    Flags,
    /// `RFC822.SIZE`
    Rfc822Size,
    /// `BODY[section]` or `BODY.PEEK[section]`.
    Body {
        /// Section specifier; `None` is the whole message.
        section: Option<String>,
        /// Use `BODY.PEEK`, which leaves `\Seen` untouched.
        peek: bool,
    },
}

/// The data items requested by a FETCH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchItems {
    /// `FAST` macro: FLAGS INTERNALDATE RFC822.SIZE.
    Fast,
    /// An explicit list of attributes.
    Items(Vec<FetchAttribute>),
}

impl FetchItems {
    /// The entire raw message without setting `\Seen`.
    #[must_use]
    pub fn full_message() -> Self {
        Self::Items(vec![FetchAttribute::Body {
            section: None,
            peek: true,
        }])
    }
}
