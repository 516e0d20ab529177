/// Represents all errors that are generated from within the Compiler
/// module and its submodules.
///
/// This type captures common metadata which is necessarily present for
/// all errors which are caused by input source code.  E.g. the line #
/// that the error occurs on. This also handles formatting all error messages
/// with the universal metadata along with the inner metadata.
///
/// The inner error allows metadata which is specific to a submodule within
/// the compiler. E.g., the errors themselves are submodule specific and
/// are stored in the `inner` field.
#[derive(Clone, Debug, PartialEq)]
pub struct CompilerError<IE> {
    line: u32,
    inner: IE,
}

impl<IE> CompilerError<IE> {
    pub fn new(line: u32, inner: IE) -> Self {
        CompilerError { line, inner }
    }

    pub fn inner(self) -> IE {
        self.inner
    }

    pub fn kind(&self) -> &IE {
        &self.inner
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// Converts the inner error while keeping the line.
    pub fn map<F, OE>(self, f: F) -> CompilerError<OE>
    where
        F: FnOnce(IE) -> OE,
    {
        CompilerError {
            line: self.line,
            inner: f(self.inner),
        }
    }
}

impl<IE> std::fmt::Display for CompilerError<IE>
where
    IE: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{}: {}", self.line, self.inner)
    }
}
