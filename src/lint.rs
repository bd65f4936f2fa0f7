//! Linter for template text: enforces the canonical `name=value` style.
//!
//! ## Rules
//!
//! - **Missing `=`**: every non-empty entry needs a `name=value` delimiter.
//! - **Space around `=`**: no blanks between name, `=`, and value.
//! - **Uppercase hex**: hex literals are written in lowercase pairs.
//! - **Duplicate name**: field names are unique within a template.
//! - **Dangling len()**: a `len(target)` value must name a declared field.
//! - **Mixed line endings**: templates use `\r\n` throughout (or `\n`
//!   throughout), not a mix.
//!
//! Run via the `lint_template` binary: `cargo run --bin lint_template -- file.tpl`
//! or pipe: `lint_template < file.tpl`. Exit code 1 if any error-level findings.

use std::collections::HashSet;

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Identifies which rule produced the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintRule {
    /// Entry has no `=` delimiter.
    MissingEquals,
    /// Blanks around the `=` delimiter.
    SpaceAroundEquals,
    /// Hex literal written with uppercase digits.
    UppercaseHex,
    /// Field name declared more than once.
    DuplicateName,
    /// `len()` value referencing an undeclared field.
    DanglingLengthTarget,
    /// Both `\r\n` and bare `\n` present.
    MixedLineEndings,
}

/// A single lint message with location.
#[derive(Debug, Clone)]
pub struct LintMessage {
    pub line: usize,
    pub column: usize,
    pub rule: LintRule,
    pub severity: Severity,
    pub message: String,
}

fn is_hex_literal(value: &str) -> bool {
    !value.is_empty() && value.len() % 2 == 0 && value.chars().all(|c| c.is_ascii_hexdigit())
}

fn length_target(value: &str) -> Option<&str> {
    let inner = value.strip_prefix("len(")?.strip_suffix(')')?;
    let target = match inner.find(',') {
        Some(i) => &inner[..i],
        None => inner,
    };
    Some(target.trim())
}

/// Run all lint rules on template source. Returns messages in line order.
pub fn lint(source: &str) -> Vec<LintMessage> {
    let mut out = Vec::new();

    let has_crlf = source.contains("\r\n");
    let bare_lf = source.replace("\r\n", "").contains('\n');
    if has_crlf && bare_lf {
        out.push(LintMessage {
            line: 1,
            column: 1,
            rule: LintRule::MixedLineEndings,
            severity: Severity::Warning,
            message: "mixed \\r\\n and \\n line endings".to_string(),
        });
    }

    // Declared names, for the dangling-len() pass.
    let mut declared = HashSet::new();
    for_each_entry(source, |_, _, entry| {
        if let Some((name, _)) = entry.split_once('=') {
            declared.insert(name.trim().to_ascii_lowercase());
        }
    });

    let mut seen = HashSet::new();
    for_each_entry(source, |line_no, col, entry| {
        let Some((name, value)) = entry.split_once('=') else {
            out.push(LintMessage {
                line: line_no,
                column: col,
                rule: LintRule::MissingEquals,
                severity: Severity::Error,
                message: format!("entry {:?} has no `=` delimiter", entry.trim()),
            });
            return;
        };
        if name != name.trim_end() || value != value.trim_start() {
            out.push(LintMessage {
                line: line_no,
                column: col,
                rule: LintRule::SpaceAroundEquals,
                severity: Severity::Warning,
                message: format!("blanks around `=` in {:?}", entry.trim()),
            });
        }
        let name = name.trim();
        let value = value.trim();
        if !seen.insert(name.to_ascii_lowercase()) {
            out.push(LintMessage {
                line: line_no,
                column: col,
                rule: LintRule::DuplicateName,
                severity: Severity::Error,
                message: format!("duplicate field name: {}", name),
            });
        }
        if is_hex_literal(value) && value.chars().any(|c| c.is_ascii_uppercase()) {
            out.push(LintMessage {
                line: line_no,
                column: col,
                rule: LintRule::UppercaseHex,
                severity: Severity::Warning,
                message: format!("hex literal {} should be lowercase", value),
            });
        }
        if let Some(target) = length_target(value) {
            if !declared.contains(&target.to_ascii_lowercase()) {
                out.push(LintMessage {
                    line: line_no,
                    column: col,
                    rule: LintRule::DanglingLengthTarget,
                    severity: Severity::Error,
                    message: format!("len() target {} is not declared", target),
                });
            }
        }
    });

    out
}

/// Fix template source to satisfy the fixable rules: trim blanks around `=`,
/// lowercase hex literals, normalize line endings. Error-level findings
/// (missing `=`, duplicates, dangling len()) are reported, not rewritten.
pub fn lint_fix(source: &str) -> String {
    let mut out_lines = Vec::new();
    for line in source.replace("\r\n", "\n").lines() {
        let entries: Vec<String> = line
            .split(',')
            .map(|entry| {
                let Some((name, value)) = entry.split_once('=') else {
                    return entry.trim().to_string();
                };
                let name = name.trim();
                let value = value.trim();
                if is_hex_literal(value) {
                    format!("{}={}", name, value.to_ascii_lowercase())
                } else {
                    format!("{}={}", name, value)
                }
            })
            .collect();
        out_lines.push(entries.join(","));
    }
    let mut fixed = out_lines.join("\r\n");
    if !fixed.is_empty() {
        fixed.push_str("\r\n");
    }
    fixed
}

/// Call `f` for each comma- or line-separated entry with its 1-based line
/// and column. Empty entries (blank lines, stray commas) are skipped.
fn for_each_entry<F: FnMut(usize, usize, &str)>(source: &str, mut f: F) {
    for (i, line) in source.lines().enumerate() {
        let mut col = 1usize;
        for entry in line.split(',') {
            if !entry.trim().is_empty() {
                f(i + 1, col, entry);
            }
            col += entry.len() + 1;
        }
    }
}
