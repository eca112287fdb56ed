//! Renders the finished summary as a standalone HTML page and writes it
//! atomically under a deterministic, Windows-safe filename.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use thiserror::Error;

use summarizer_engine::sanitize_summary_html;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Render and atomically write the summary page; returns the final path.
///
/// The summary passes through the sanitizer once more before rendering; the
/// sanitizer is idempotent.
pub fn write_summary_page(
    dir: &Path,
    title: &str,
    url: &str,
    badge_label: &str,
    badge_class: &str,
    summary_html: &str,
) -> Result<PathBuf, ExportError> {
    ensure_output_dir(dir)?;

    let page = render_page(title, url, badge_label, badge_class, summary_html);
    let target = dir.join(page_filename(title, url));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(page.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    if target.exists() {
        fs::remove_file(&target)?;
    }
    tmp.persist(&target).map_err(|e| ExportError::Io(e.error))?;
    Ok(target)
}

fn ensure_output_dir(dir: &Path) -> Result<(), ExportError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| ExportError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(ExportError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| ExportError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

fn render_page(
    title: &str,
    url: &str,
    badge_label: &str,
    badge_class: &str,
    summary_html: &str,
) -> String {
    let generated_at = Utc::now().format("%Y-%m-%d %H:%M UTC");
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"ja\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         <style>{style}</style>\n\
         </head>\n\
         <body>\n\
         <header class=\"page-header\">\n\
         <span class=\"{badge_class}\">{badge_label}</span>\n\
         <h1>{title}</h1>\n\
         <a class=\"source-url\" href=\"{url}\">{url}</a>\n\
         </header>\n\
         <main class=\"summary\">\n{summary}\n</main>\n\
         <footer class=\"page-footer\">{generated_at}</footer>\n\
         </body>\n\
         </html>\n",
        title = escape_html(title),
        style = PAGE_STYLE,
        badge_class = badge_class,
        badge_label = badge_label,
        url = escape_html(url),
        summary = sanitize_summary_html(summary_html),
        generated_at = generated_at,
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Windows-safe, deterministic filename: `{sanitized_title}--{short_hash(url)}.html`
fn page_filename(title: &str, url: &str) -> String {
    format!("{}--{}.html", sanitize_title(title), short_hash(url))
}

fn sanitize_title(input: &str) -> String {
    let mut cleaned = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let mapped = if is_forbidden(c) { '_' } else { c };
        if mapped == '_' {
            if !prev_underscore {
                cleaned.push('_');
            }
            prev_underscore = true;
        } else {
            cleaned.push(mapped);
            prev_underscore = false;
        }
    }
    let mut cleaned = cleaned.trim_matches(['_', ' ', '.'].as_ref()).to_string();
    if cleaned.is_empty() {
        cleaned = "untitled".to_string();
    }
    if cleaned.len() > 80 {
        let mut end = 80;
        while end > 0 && !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned.truncate(end);
    }
    if is_reserved_windows_name(&cleaned) {
        cleaned.push('_');
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

// The stylesheet the prompt's diagram class names key into. Class names here
// must stay in lockstep with the prompt templates.
const PAGE_STYLE: &str = r#"
body { font-family: sans-serif; margin: 0 auto; max-width: 860px; padding: 24px; color: #222; }
.page-header h1 { margin: 8px 0 4px; font-size: 1.5em; }
.source-url { color: #888; font-size: 0.85em; word-break: break-all; }
.page-footer { margin-top: 32px; color: #aaa; font-size: 0.8em; }
.badge { display: inline-block; padding: 2px 10px; border-radius: 10px; font-size: 0.8em; color: #fff; }
.badge-youtube { background: #c00; }
.badge-web { background: #06c; }
.summary h2 { border-bottom: 2px solid #eee; padding-bottom: 4px; margin-top: 28px; }
.diagram-flow { display: flex; flex-wrap: wrap; align-items: center; gap: 8px; margin: 16px 0; }
.flow-step { background: #eef4ff; border: 1px solid #c8d8f8; border-radius: 8px; padding: 8px 14px; text-align: center; }
.flow-step.highlight { background: #dbe9ff; border-color: #7aa7e8; font-weight: bold; }
.flow-sub { font-size: 0.75em; color: #667; }
.flow-arrow { color: #89a; font-weight: bold; }
.diagram-compare { display: flex; gap: 12px; margin: 16px 0; }
.compare-card { flex: 1; border: 1px solid #ddd; border-radius: 8px; overflow: hidden; }
.compare-title { background: #f2f5f9; padding: 6px 12px; font-weight: bold; }
.compare-body { padding: 6px 12px; }
.diagram-steps { margin: 16px 0; }
.step { display: flex; gap: 12px; margin-bottom: 8px; }
.step-number { background: #06c; color: #fff; border-radius: 50%; width: 26px; height: 26px; text-align: center; line-height: 26px; flex: none; }
.step-line { width: 2px; background: #cde; }
.step-title { font-weight: bold; }
.step-desc { color: #556; font-size: 0.9em; }
.diagram-stats { display: flex; flex-wrap: wrap; gap: 12px; margin: 16px 0; }
.stat-card { border: 1px solid #ddd; border-radius: 8px; padding: 12px 18px; text-align: center; }
.stat-value { font-size: 1.5em; font-weight: bold; color: #06c; }
.stat-label { color: #667; font-size: 0.85em; }
.diagram-info { border-left: 4px solid; border-radius: 4px; padding: 10px 14px; margin: 16px 0; }
.info-blue { border-color: #06c; background: #eef4ff; }
.info-green { border-color: #2a4; background: #ecf9ef; }
.info-yellow { border-color: #ca0; background: #fdf8e4; }
.info-red { border-color: #c33; background: #fdeeee; }
.info-title { font-weight: bold; margin-bottom: 4px; }
.diagram-table { border-collapse: collapse; margin: 16px 0; width: 100%; }
.diagram-table th, .diagram-table td { border: 1px solid #ddd; padding: 6px 10px; }
.diagram-table th { background: #f2f5f9; }
.diagram-timeline { border-left: 3px solid #cde; margin: 16px 0; padding-left: 16px; }
.tl-item { margin-bottom: 12px; }
.tl-time { color: #06c; font-weight: bold; font-size: 0.85em; }
.tl-title { font-weight: bold; }
.tl-desc { color: #556; font-size: 0.9em; }
.diagram-proscons { display: flex; gap: 12px; margin: 16px 0; }
.pros, .cons { flex: 1; border-radius: 8px; padding: 10px 14px; }
.pros { background: #ecf9ef; }
.cons { background: #fdeeee; }
.pc-title { font-weight: bold; margin-bottom: 6px; }
.diagram-bars { margin: 16px 0; }
.bar-item { margin-bottom: 10px; }
.bar-label { display: flex; justify-content: space-between; font-size: 0.9em; }
.bar-track { background: #eee; border-radius: 6px; height: 10px; }
.bar-fill { background: #06c; border-radius: 6px; height: 10px; }
.diagram-hub { display: flex; flex-wrap: wrap; gap: 10px; align-items: center; justify-content: center; margin: 16px 0; }
.hub-node { border: 1px solid #c8d8f8; border-radius: 16px; padding: 6px 14px; background: #eef4ff; }
.hub-center { border-radius: 16px; padding: 10px 18px; background: #06c; color: #fff; font-weight: bold; }
"#;
