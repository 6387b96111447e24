//! Compilation and table format errors.

/// Fatal error while compiling a grammar into a table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("grammar has no rules")]
    NoRules,

    #[error("undefined symbol `{name}` referenced from rule `{rule}`")]
    UndefinedSymbol { name: String, rule: String },

    #[error("unknown precedence `{name}` in rule `{rule}`")]
    UnknownPrecedence { name: String, rule: String },

    #[error("extra `{name}` is not a token")]
    UnsupportedExtra { name: String },

    #[error("external token must be a symbol or a string, found {found}")]
    UnsupportedExternal { found: String },

    #[error("symbol `{name}` used inside a token in rule `{rule}`")]
    SymbolInToken { name: String, rule: String },

    #[error("token `{name}` matches the empty string")]
    EmptyToken { name: String },

    #[error("invalid regex `{pattern}`: {message}")]
    Regex { pattern: String, message: String },

    #[error(
        "unresolved conflict for rules [{}] on `{lookahead}` in state {state}:\n{items}",
        .rules.join(", ")
    )]
    UnresolvedConflict {
        state: u16,
        lookahead: String,
        rules: Vec<String>,
        items: String,
    },

    #[error("too many symbols: {0} (max 65534)")]
    TooManySymbols(usize),

    #[error("too many states: {0} (max 65534)")]
    TooManyStates(usize),

    #[error("conflict declaration names unknown rule `{0}`")]
    UnknownConflictRule(String),
}

/// Error while decoding a serialized table.
#[derive(Debug, thiserror::Error)]
pub enum TableFormatError {
    #[error("invalid magic: expected GLST")]
    InvalidMagic,

    #[error("unsupported version: {0} (expected {FORMAT_VERSION})", FORMAT_VERSION = crate::binary::FORMAT_VERSION)]
    UnsupportedVersion(u32),

    #[error("file too small: {0} bytes (minimum {min})", min = crate::binary::HEADER_SIZE)]
    FileTooSmall(usize),

    #[error("size mismatch: header says {header} bytes, got {actual}")]
    SizeMismatch { header: u32, actual: usize },

    #[error("checksum mismatch: expected {expected:08x}, found {found:08x}")]
    ChecksumMismatch { expected: u32, found: u32 },

    #[error("table decode error: {0}")]
    Decode(#[from] postcard::Error),

    #[error("invalid lexer automaton for token {terminal}: {message}")]
    Dfa { terminal: u16, message: String },
}
