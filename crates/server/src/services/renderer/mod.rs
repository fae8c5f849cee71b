// PDF rendering for inspection reports

pub mod layout;

use std::io;
use std::path::{Path, PathBuf};

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use tokio::{fs, io::AsyncWriteExt};

pub use layout::RenderInput;
use layout::{Document, Font, Op, PAGE_HEIGHT, PAGE_WIDTH};

const FONT_REGULAR: Name<'static> = Name(b"F1");
const FONT_BOLD: Name<'static> = Name(b"F2");

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to prepare output directory {path}: {source}")]
    OutputDir { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Clone, Debug, Default)]
pub struct ReportRenderer;

impl ReportRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Lays out and writes the report to `target`, replacing any file already
    /// there. Returns only once the file is flushed and synced.
    pub async fn render(
        &self,
        input: &RenderInput<'_>,
        target: &Path,
    ) -> Result<PathBuf, RenderError> {
        let document = layout::layout(input);
        let bytes = encode_pdf(&document);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| RenderError::OutputDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        // Write beside the target and rename so a failed write never
        // replaces an existing artifact.
        let partial = partial_path(target);
        let written = match write_synced(&partial, &bytes).await {
            Ok(()) => fs::rename(&partial, target).await,
            Err(e) => Err(e),
        };
        if let Err(source) = written {
            if let Err(e) = fs::remove_file(&partial).await {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove partial PDF {}: {e}", partial.display());
                }
            }
            return Err(RenderError::Write {
                path: target.to_path_buf(),
                source,
            });
        }

        tracing::debug!(
            "Rendered {} page(s) to {}",
            document.pages.len(),
            target.display()
        );
        Ok(target.to_path_buf())
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    target.with_file_name(name)
}

async fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}

/// Latin-1 subset of WinAnsi; anything else becomes `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7e | 0xa0..=0xff => c as u32 as u8,
            0x09 => b' ',
            _ => b'?',
        })
        .collect()
}

pub fn encode_pdf(document: &Document) -> Vec<u8> {
    let mut pdf = Pdf::new();

    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let regular_id = Ref::new(3);
    let bold_id = Ref::new(4);
    let info_id = Ref::new(5);

    let page_ids: Vec<Ref> = (0..document.pages.len())
        .map(|i| Ref::new(6 + 2 * i as i32))
        .collect();

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    pdf.type1_font(regular_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    let title = document.title.clone();
    pdf.document_info(info_id)
        .title(TextStr(&title))
        .producer(TextStr("sitereport-server"));

    for (page, &page_id) in document.pages.iter().zip(&page_ids) {
        let content_id = Ref::new(page_id.get() + 1);

        let mut content = Content::new();
        content.set_line_width(0.5);
        for op in &page.ops {
            match op {
                Op::Text {
                    x,
                    y,
                    size,
                    font,
                    text,
                } => {
                    let font_name = match font {
                        Font::Regular => FONT_REGULAR,
                        Font::Bold => FONT_BOLD,
                    };
                    let encoded = encode_text(text);
                    content.begin_text();
                    content.set_font(font_name, *size);
                    content.next_line(*x, *y);
                    content.show(Str(&encoded));
                    content.end_text();
                }
                Op::Rule { x1, y1, x2, y2 } => {
                    content.move_to(*x1, *y1);
                    content.line_to(*x2, *y2);
                    content.stroke();
                }
            }
        }
        pdf.stream(content_id, &content.finish());

        let mut pdf_page = pdf.page(page_id);
        pdf_page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
        pdf_page.parent(page_tree_id);
        pdf_page.contents(content_id);
        pdf_page
            .resources()
            .fonts()
            .pair(FONT_REGULAR, regular_id)
            .pair(FONT_BOLD, bold_id);
        pdf_page.finish();
    }

    pdf.finish()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use tempfile::tempdir;

    use super::*;
    use crate::db::models::{Report, ReportStatus};

    fn report() -> Report {
        let now = Utc::now();
        Report {
            id: "65f0c0ffee00000000000001".to_string(),
            title: "Slab Pour".to_string(),
            content: "Pour completed without cold joints.".to_string(),
            author: "Lee Park".to_string(),
            job_name: "Harbor".to_string(),
            project_id: None,
            inspector_id: None,
            inspection_type: "concrete".to_string(),
            findings: "Cylinders taken".to_string(),
            recommendations: "Cure 7 days".to_string(),
            status: ReportStatus::Submitted,
            labor: Vec::new(),
            equipment: Vec::new(),
            weather: None,
            extensions: BTreeMap::new(),
            pdf_path: None,
            is_draft: false,
            created_by: "65f0c0ffee00000000000002".to_string(),
            edited_by: None,
            edited_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn encodes_latin1_and_replaces_the_rest() {
        assert_eq!(encode_text("ok"), b"ok".to_vec());
        assert_eq!(encode_text("25 °C"), vec![b'2', b'5', b' ', 0xb0, b'C']);
        assert_eq!(encode_text("漢"), b"?".to_vec());
    }

    #[tokio::test]
    async fn writes_complete_pdf() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nested").join("out.pdf");
        let r = report();
        let input = RenderInput {
            report: &r,
            project: None,
            inspector: None,
            generated_at: Utc::now(),
        };

        let path = ReportRenderer::new().render(&input, &target).await.unwrap();
        assert_eq!(path, target);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let tail = String::from_utf8_lossy(&bytes[bytes.len().saturating_sub(16)..]).into_owned();
        assert!(tail.contains("%%EOF"), "{tail}");
    }

    #[tokio::test]
    async fn rerender_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("same.pdf");
        std::fs::write(&target, b"stale").unwrap();

        let r = report();
        let input = RenderInput {
            report: &r,
            project: None,
            inspector: None,
            generated_at: Utc::now(),
        };
        ReportRenderer::new().render(&input, &target).await.unwrap();

        assert!(std::fs::read(&target).unwrap().starts_with(b"%PDF-"));
        assert!(!partial_path(&target).exists());
    }

    #[tokio::test]
    async fn unwritable_target_is_a_render_error() {
        let dir = tempdir().unwrap();
        // a regular file where the output directory should be
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();

        let r = report();
        let input = RenderInput {
            report: &r,
            project: None,
            inspector: None,
            generated_at: Utc::now(),
        };
        let result = ReportRenderer::new()
            .render(&input, &blocker.join("out.pdf"))
            .await;
        assert!(matches!(result, Err(RenderError::OutputDir { .. })));
    }
}
