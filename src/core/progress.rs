//! User-facing progress reporting
//!
//! Core steps describe what they are doing through [`Progress`]; the CLI
//! decides how that looks on the terminal.

/// Receiver for step-by-step progress messages
pub trait Progress {
    /// Start of a major section, e.g. building one package
    fn announce(&self, message: &str);

    /// Start of a short step; completed by [`Progress::ok`]
    fn note(&self, message: &str);

    /// The last noted step succeeded
    fn ok(&self);

    /// Informational line
    fn info(&self, message: &str);

    /// Something the user should act on
    fn warn(&self, message: &str);
}
