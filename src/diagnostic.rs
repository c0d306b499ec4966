use std::io::Write;

use crate::span::Span;

/// A fetcher error ready for rendering.
///
/// Diagnostics from a declaration or cache file carry the file name and a
/// byte span; everything else uses [`Span::dummy`] and is rendered without a
/// source snippet.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub message: String,
    pub file: Option<String>,
    pub span: Span,
    pub label: Option<String>,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

/// Name used for diagnostics without a source file.
const SYNTHETIC_FILE: &str = "<reky>";

impl Diagnostic {
    pub fn error(message: String) -> Self {
        Self {
            message,
            file: None,
            span: Span::dummy(),
            label: None,
            notes: Vec::new(),
            help: None,
        }
    }

    /// Attach a file location and the label shown under the offending text.
    pub fn at(mut self, file: String, span: Span, label: String) -> Self {
        self.file = Some(file);
        self.span = span;
        self.label = Some(label);
        self
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Render the diagnostic to stderr using ariadne.
    ///
    /// `source` is the full text of the file the span points into; it is
    /// ignored for diagnostics without a location.
    pub fn render(&self, source: &str) {
        let _ = self.write(source, std::io::stderr(), true);
    }

    /// Render the diagnostic into `out`.
    pub fn write<W: Write>(&self, source: &str, out: W, color: bool) -> std::io::Result<()> {
        use ariadne::{Color, Config, Label, Report, ReportKind, Source};

        let (filename, text) = match &self.file {
            Some(file) => (file.as_str(), source),
            None => (SYNTHETIC_FILE, ""),
        };

        let mut report = Report::build(ReportKind::Error, filename, self.span.start as usize)
            .with_config(Config::default().with_color(color))
            .with_message(&self.message);

        if self.file.is_some() {
            let label = self.label.as_deref().unwrap_or(&self.message);
            report = report.with_label(
                Label::new((filename, self.span.range()))
                    .with_message(label)
                    .with_color(Color::Red),
            );
        }

        for note in &self.notes {
            report = report.with_note(note);
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        report.finish().write((filename, Source::from(text)), out)
    }
}

/// Render a list of diagnostics that share one source text.
pub fn render_diagnostics(diagnostics: &[Diagnostic], source: &str) {
    for diag in diagnostics {
        diag.render(source);
    }
}
