use rowan::TextRange;

/// Diagnostic kinds ordered by priority (highest priority first).
///
/// When a higher-priority diagnostic's span strictly contains another's, the
/// inner one is suppressed by [`Diagnostics::filtered`](super::Diagnostics::filtered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Bytes no terminal matches
    UnrecognizedInput,

    // Syntax errors found by recovery
    UnexpectedToken,
    MissingInput,

    // Parse limits
    AmbiguityOverflow,
    Cancelled,
    FuelExhausted,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::AmbiguityOverflow => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Lower discriminant wins.
    pub fn suppresses(&self, other: &DiagnosticKind) -> bool {
        self < other
    }

    /// Syntax errors, as opposed to notes about parse limits.
    pub fn is_syntax_error(&self) -> bool {
        matches!(
            self,
            Self::UnrecognizedInput | Self::UnexpectedToken | Self::MissingInput
        )
    }

    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::UnrecognizedInput => "unrecognized input",
            Self::UnexpectedToken => "unexpected token",
            Self::MissingInput => "missing input",
            Self::AmbiguityOverflow => "too many ambiguous parses",
            Self::Cancelled => "parse cancelled",
            Self::FuelExhausted => "parse ran out of fuel",
        }
    }

    /// Template for custom messages. Contains `{}` for the caller's detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::UnrecognizedInput => "unrecognized input `{}`".to_string(),
            Self::UnexpectedToken => "unexpected `{}`".to_string(),
            Self::MissingInput => "expected {}".to_string(),
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// `None` gives the fallback message; `Some(detail)` fills the template.
    pub fn message(&self, detail: Option<&str>) -> String {
        match detail {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) range: TextRange,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(range: TextRange, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
        }
    }
}

/// One reported problem with a byte range into the parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub(crate) kind: DiagnosticKind,
    pub(crate) range: TextRange,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
}

impl Diagnostic {
    pub(crate) fn new(kind: DiagnosticKind, range: TextRange, message: impl Into<String>) -> Self {
        Self {
            kind,
            range,
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub(crate) fn with_default_message(kind: DiagnosticKind, range: TextRange) -> Self {
        Self::new(kind, range, kind.fallback_message())
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}..{}: {}",
            self.severity(),
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.message
        )?;
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message,
                u32::from(related.range.start()),
                u32::from(related.range.end())
            )?;
        }
        Ok(())
    }
}
