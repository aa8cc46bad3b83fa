//! Source code representation and error management.

use std::{cell::RefCell, fmt, ops::Range};

/// Represents source code.
pub struct Source<'a> {
    /// Original source code.
    pub content: &'a str,
    /// Accumulated errors.
    pub errors: ErrorReporter,
}

impl<'a> Source<'a> {
    /// Create a new `Source` with the specified `content`.
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            errors: ErrorReporter::new(),
        }
    }

    /// Returns `true` if `Source` has no accumulated errors. Returns `false` otherwise.
    pub fn has_no_errors(&self) -> bool {
        self.errors.errors.borrow().len() == 0
    }

    /// Returns the 1-based line number that `pos` (a byte offset) falls on.
    pub fn line_of(&self, pos: usize) -> usize {
        let pos = pos.min(self.content.len());
        self.content[..pos].matches('\n').count() + 1
    }
}

impl<'a> Into<Source<'a>> for &'a str {
    fn into(self) -> Source<'a> {
        Source::new(self)
    }
}

/// Renders the accumulated diagnostics, one per line, in the form
/// `[line N] Error at 'lexeme': message` (or `at end` when the error is at end of input).
impl<'a> fmt::Display for Source<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self.errors.errors.borrow();
        for error in errors.iter() {
            let line = self.line_of(error.span.start);
            let lexeme = self
                .content
                .get(error.span.start..error.span.end.min(self.content.len()))
                .unwrap_or("");
            if lexeme.is_empty() {
                writeln!(f, "[line {}] Error at end: {}", line, error.message)?;
            } else {
                writeln!(f, "[line {}] Error at '{}': {}", line, lexeme, error.message)?;
            }
        }

        Ok(())
    }
}

/// Represents a syntax error (compile time error).
#[derive(Debug, Clone)]
pub struct SyntaxError {
    message: String,
    span: Range<usize>,
}

impl SyntaxError {
    /// Create a new syntax error with the specified `message` and `span`.
    pub fn new(message: impl ToString, span: Range<usize>) -> Self {
        Self {
            message: message.to_string(),
            span,
        }
    }
}

/// Manages all the errors.
pub struct ErrorReporter {
    errors: RefCell<Vec<SyntaxError>>,
}

impl ErrorReporter {
    /// Create an empty `ErrorReporter`.
    pub fn new() -> Self {
        Self {
            errors: RefCell::new(Vec::new()),
        }
    }

    /// Adds an error to the `ErrorReporter`.
    /// This method uses the interior mutability pattern. This does not require mutability for ergonomics.
    pub fn add_error(&self, error: SyntaxError) {
        // This should be the only place where self.errors is borrowed mutably.
        self.errors.borrow_mut().push(error);
    }

    /// Number of errors reported so far.
    pub fn len(&self) -> usize {
        self.errors.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_of_counts_newlines() {
        let source = Source::new("first\nsecond\nthird");
        assert_eq!(source.line_of(0), 1);
        assert_eq!(source.line_of(5), 1);
        assert_eq!(source.line_of(6), 2);
        assert_eq!(source.line_of(13), 3);
        assert_eq!(source.line_of(1000), 3); // clamped to end of input
    }

    #[test]
    fn renders_errors_with_line_and_lexeme() {
        let source = Source::new("var x\nvar y = ;");
        source.errors.add_error(SyntaxError::new("Expect expression.", 14..15));
        assert!(!source.has_no_errors());
        assert_eq!(
            source.to_string(),
            "[line 2] Error at ';': Expect expression.\n"
        );
    }

    #[test]
    fn renders_error_at_end() {
        let source = Source::new("var x = 1");
        source.errors.add_error(SyntaxError::new("Expect ';' after variable declaration.", 9..9));
        assert_eq!(
            source.to_string(),
            "[line 1] Error at end: Expect ';' after variable declaration.\n"
        );
    }
}
