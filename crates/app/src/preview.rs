//! Preview of the generated document: highlighted HTML source, a plain-text
//! extraction, and a hand-off to the real browser.

use anyhow::{Context, Result};
use egui::ScrollArea;
use std::fs;
use std::path::PathBuf;

pub struct HtmlPreview {
    show_source: bool,
}

impl Default for HtmlPreview {
    fn default() -> Self {
        Self { show_source: true }
    }
}

impl HtmlPreview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, html: &str) {
        ui.horizontal(|ui| {
            if ui.button("Open in Browser").clicked() {
                if let Err(err) = open_in_browser(html) {
                    tracing::warn!("failed to open preview in browser: {:#}", err);
                }
            }
            ui.checkbox(&mut self.show_source, "Show Source");
        });
        ui.separator();

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if self.show_source {
                    ui.label(highlight_html(ui, html));
                } else {
                    ui.label(extract_text(html));
                }
            });
    }
}

/// Write the document to a scratch file and hand it to the default browser.
fn open_in_browser(html: &str) -> Result<()> {
    let dir = scratch_dir();
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join("preview.html");
    fs::write(&path, html).with_context(|| format!("writing {}", path.display()))?;
    open::that(&path).context("launching browser")?;
    Ok(())
}

fn scratch_dir() -> PathBuf {
    directories::ProjectDirs::from("com.local", "Siteweaver", "Siteweaver")
        .map(|p| p.cache_dir().join("preview"))
        .unwrap_or_else(std::env::temp_dir)
}

/// Minimal tag/text coloring so the source stays scannable.
fn highlight_html(ui: &egui::Ui, html: &str) -> egui::text::LayoutJob {
    let tag_color = egui::Color32::from_rgb(86, 156, 214);
    let text_color = ui.visuals().text_color();

    let mut job = egui::text::LayoutJob::default();
    let mut chunk = String::new();
    let mut in_tag = false;

    let flush = |job: &mut egui::text::LayoutJob, chunk: &mut String, color: egui::Color32| {
        if !chunk.is_empty() {
            job.append(
                chunk,
                0.0,
                egui::TextFormat {
                    color,
                    ..Default::default()
                },
            );
            chunk.clear();
        }
    };

    for ch in html.chars() {
        match ch {
            '<' => {
                flush(&mut job, &mut chunk, text_color);
                in_tag = true;
                chunk.push(ch);
            }
            '>' if in_tag => {
                chunk.push(ch);
                flush(&mut job, &mut chunk, tag_color);
                in_tag = false;
            }
            _ => chunk.push(ch),
        }
    }
    flush(&mut job, &mut chunk, if in_tag { tag_color } else { text_color });
    job
}

/// Strip tags (and script/style bodies) for the text-only view.
fn extract_text(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;
    let mut skip_depth = 0usize;

    let lower = html.to_lowercase();
    let chars: Vec<char> = html.chars().collect();
    let lower_chars: Vec<char> = lower.chars().collect();

    let mut i = 0;
    while i < chars.len() {
        if !in_tag && chars[i] == '<' {
            let rest: String = lower_chars[i..].iter().take(10).collect();
            if rest.starts_with("<script") || rest.starts_with("<style") {
                skip_depth += 1;
            } else if rest.starts_with("</script") || rest.starts_with("</style") {
                skip_depth = skip_depth.saturating_sub(1);
            }
            in_tag = true;
        } else if in_tag && chars[i] == '>' {
            in_tag = false;
            result.push(' ');
        } else if !in_tag && skip_depth == 0 {
            result.push(chars[i]);
        }
        i += 1;
    }

    result
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_text_drops_tags_and_scripts() {
        let html = "<html><head><script>var x = 1;</script></head>\
                    <body><h1>Hello</h1> <p>world</p></body></html>";
        assert_eq!(extract_text(html), "Hello world");
    }
}
