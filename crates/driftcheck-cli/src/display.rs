//! Display formatting for CLI output
//!
//! The drift report goes to one writer (stdout) and notices to another
//! (stderr). Colors come from an explicit [`Palette`] value so output can be
//! rendered plain for pipes and tests.

use console::Style;
use driftcheck_core::{DriftReport, Resolution, Target};
use driftcheck_kube::{KubeError, ReportSink, RunSummary};
use std::io::{self, Write};

/// Styles used for each kind of output line
#[derive(Debug, Clone)]
pub struct Palette {
    pub header: Style,
    pub success: Style,
    pub warn: Style,
    pub fail: Style,
    pub dim: Style,
}

impl Palette {
    /// Colors, applied when the terminal supports them
    pub fn colored() -> Self {
        Self {
            header: Style::new().bold(),
            success: Style::new().green(),
            warn: Style::new().yellow(),
            fail: Style::new().red(),
            dim: Style::new().dim(),
        }
    }

    /// No styling at all
    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            warn: Style::new(),
            fail: Style::new(),
            dim: Style::new(),
        }
    }

    pub fn for_color(color: bool) -> Self {
        if color { Self::colored() } else { Self::plain() }
    }
}

/// Writes target blocks as the drift checker reports them
pub struct TerminalReporter<O: Write, E: Write> {
    out: O,
    err: E,
    palette: Palette,
    /// First write failure; later writes are skipped
    failed: Option<io::Error>,
}

impl<O: Write, E: Write> TerminalReporter<O, E> {
    pub fn new(out: O, err: E, palette: Palette) -> Self {
        Self {
            out,
            err,
            palette,
            failed: None,
        }
    }

    /// Print the block for one report: `No diff.` or presence lines and changes
    pub fn print_report(&mut self, report: &DriftReport) {
        let block = render_report(report, &self.palette);
        self.write_out(&block);
    }

    /// Print the `# <label>` line opening a block
    pub fn print_header(&mut self, label: &str) {
        let line = format!("{}\n", self.palette.header.apply_to(format!("# {}", label)));
        self.write_out(&line);
    }

    /// Print run totals to the notice stream
    pub fn print_summary(&mut self, summary: &RunSummary) {
        if summary.total() == 0 {
            return;
        }
        let line = format!("{}\n", self.palette.dim.apply_to(summary.summary()));
        self.write_err(&line);
    }

    /// Flush both writers, returning the first write error if any
    pub fn finish(mut self) -> io::Result<()> {
        if let Some(e) = self.failed.take() {
            return Err(e);
        }
        self.out.flush()?;
        self.err.flush()
    }

    /// Consume the reporter, returning its writers
    #[cfg(test)]
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    fn write_out(&mut self, text: &str) {
        if self.failed.is_none() {
            if let Err(e) = self.out.write_all(text.as_bytes()) {
                self.failed = Some(e);
            }
        }
    }

    fn write_err(&mut self, text: &str) {
        if self.failed.is_none() {
            if let Err(e) = self.err.write_all(text.as_bytes()) {
                self.failed = Some(e);
            }
        }
    }
}

impl<O: Write, E: Write> ReportSink for TerminalReporter<O, E> {
    fn begin_target(&mut self, target: &Target) {
        self.print_header(&target.label());
    }

    fn fallback_used(&mut self, _target: &Target, resolution: &Resolution) {
        if let Some(notice) = resolution.notice() {
            let line = format!("{}\n", self.palette.warn.apply_to(notice));
            self.write_err(&line);
        }
    }

    fn report(&mut self, _target: &Target, report: &DriftReport) {
        self.print_report(report);
    }

    fn skipped(&mut self, _target: &Target, _error: &KubeError) {
        // The warning itself is logged by the checker
        self.write_out("\n");
    }
}

/// Render one report block
pub fn render_report(report: &DriftReport, palette: &Palette) -> String {
    if report.is_empty() {
        return format!("{}\n\n", palette.success.apply_to("No diff."));
    }

    let mut output = String::new();

    let presences = report.presence_lines();
    if !presences.is_empty() {
        for line in presences {
            output.push_str(&palette.fail.apply_to(line).to_string());
            output.push('\n');
        }
        output.push('\n');
    }

    if !report.changed.is_empty() {
        let changes = report
            .changed
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        output.push_str(&palette.fail.apply_to(changes).to_string());
        output.push('\n');
    }

    output
}
