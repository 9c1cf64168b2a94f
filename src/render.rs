//! Human-readable rendering of a finished report.
//!
//! Rendering is pure: it produces the lines and the overall verdict, and
//! `Rendered::emit` routes them to the logger sinks afterwards.

use owo_colors::{OwoColorize, Style};
use regex::Regex;
use std::sync::LazyLock;

use crate::classify::Classification;
use crate::config::{DEFAULT_WRAP_WIDTH, WRAP_INDENT};
use crate::logger::ReportLogger;
use crate::model::{Finding, Report, ReportEntry};

static CONTEXT_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n]+\s+").unwrap());

const BULLET: &str = "\u{2022}";
const PASS_MARK: &str = "\u{2714}";
const FAIL_MARK: &str = "\u{2718}";

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub wrap_width: usize,
    pub color: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            wrap_width: DEFAULT_WRAP_WIDTH,
            color: true,
        }
    }
}

/// Applies styles only when color output is on.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    color: bool,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    fn success(&self, text: &str) -> String {
        self.paint(text, Style::new().green())
    }

    fn failure(&self, text: &str) -> String {
        self.paint(text, Style::new().red())
    }

    fn dim(&self, text: &str) -> String {
        self.paint(text, Style::new().bright_black())
    }

    fn marker(&self, text: &str) -> String {
        self.paint(text, Style::new().cyan())
    }
}

/// Rendered report lines and whether every target passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub success: bool,
    pub lines: Vec<String>,
}

impl Rendered {
    /// Send every line to `info` for a passing run, to `error` otherwise.
    pub fn emit(&self, logger: &dyn ReportLogger) {
        for line in &self.lines {
            if self.success {
                logger.info(line);
            } else {
                logger.error(line);
            }
        }
    }
}

/// Wrap `text` to `width` columns with every line indented by `WRAP_INDENT`.
///
/// Words are never split, so a single word longer than the available space
/// gets a line of its own. Explicit line breaks are kept; blank lines at the
/// start and end of the block are dropped.
///
/// Width is counted in `char`s, so double-width glyphs (CJK, most emoji) can
/// push a line past `width` on a terminal.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let indent = " ".repeat(WRAP_INDENT);
    let mut lines = Vec::new();

    for hard_line in text.lines() {
        let mut current = indent.clone();
        let mut current_width = WRAP_INDENT;
        for word in hard_line.split_whitespace() {
            let word_width = word.chars().count();
            let has_words = current_width > WRAP_INDENT;
            if has_words && current_width + 1 + word_width > width {
                lines.push(std::mem::replace(&mut current, indent.clone()));
                current_width = WRAP_INDENT;
            }
            if current_width > WRAP_INDENT {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(word);
            current_width += word_width;
        }
        lines.push(current.trim_end().to_string());
    }

    let first = lines.iter().position(|l| !l.is_empty());
    let last = lines.iter().rposition(|l| !l.is_empty());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].to_vec(),
        _ => Vec::new(),
    }
}

/// Wrap `text` and put a bullet where the first line's indent was.
fn bulleted(text: &str, width: usize, palette: Palette) -> Vec<String> {
    let bullet = palette.failure(BULLET);
    let mut lines = wrap(text, width);
    match lines.first_mut() {
        Some(first) => *first = format!(" {} {}", bullet, first.trim_start()),
        None => lines.push(format!(" {}", bullet)),
    }
    lines
}

fn render_finding(finding: &Finding, width: usize, palette: Palette, lines: &mut Vec<String>) {
    lines.push(String::new());
    lines.extend(bulleted(&finding.message, width, palette));

    if let Some(selector) = &finding.selector {
        lines.push(String::new());
        lines.extend(
            wrap(&format!("({})", selector), width)
                .iter()
                .map(|l| palette.dim(l)),
        );
    }

    if let Some(context) = &finding.context {
        let context = CONTEXT_BREAKS.replace_all(context, " ");
        lines.push(String::new());
        lines.extend(wrap(&context, width).iter().map(|l| palette.dim(l)));
    }
}

/// Render a finished report.
pub fn render(report: &Report, options: &RenderOptions) -> Rendered {
    let palette = Palette::new(options.color);
    let width = options.wrap_width;
    let pass_ratio = report.pass_ratio();

    if report.all_passed() {
        return Rendered {
            success: true,
            lines: vec![
                String::new(),
                palette.success(&format!("{} {}", PASS_MARK, pass_ratio)),
            ],
        };
    }

    let mut lines = Vec::new();
    for (url, entries) in &report.results {
        if entries.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(palette.paint(&format!("Errors in {}:", url), Style::new().underline()));

        for entry in entries {
            match entry {
                ReportEntry::Failure { message } => {
                    lines.push(String::new());
                    lines.extend(bulleted(&format!("Error: {}", message), width, palette));
                }
                ReportEntry::Finding(finding) => {
                    render_finding(finding, width, palette, &mut lines);
                }
            }
        }
    }
    lines.push(String::new());
    lines.push(palette.failure(&format!("{} {}", FAIL_MARK, pass_ratio)));

    Rendered {
        success: false,
        lines,
    }
}

// ============================================================================
// Progress lines, written while the batch runs
// ============================================================================

pub fn progress_header(total: usize, color: bool) -> String {
    Palette::new(color).paint(
        &format!("Running accessibility checks on {} URLs:", total),
        Style::new().cyan().underline(),
    )
}

/// One line per completed target, plus whether it belongs on the error sink.
pub fn progress_line(url: &str, classification: &Classification, color: bool) -> (bool, String) {
    let palette = Palette::new(color);
    let prefix = format!(" {} {} - ", palette.marker(">"), url);

    if classification.is_failure() {
        (true, format!("{}{}", prefix, palette.failure("Failed to run")))
    } else if classification.is_pass {
        (false, format!("{}{}", prefix, palette.success("0 errors")))
    } else {
        let errors = format!("{} errors", classification.error_count());
        (true, format!("{}{}", prefix, palette.failure(&errors)))
    }
}
