//! Page layout for inspection reports.
//!
//! Text measurement is a heuristic: every glyph is assumed to be half the
//! font size wide. Blocks are laid out top to bottom and a new page starts
//! whenever the cursor would cross the bottom margin.

use chrono::{DateTime, Utc};

use crate::db::models::{ExtensionValue, Project, Report, User};

pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;
pub const MARGIN: f32 = 50.0;
pub const BOTTOM_LIMIT: f32 = 60.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
pub const LABEL_WIDTH: f32 = 150.0;
pub const VALUE_WIDTH: f32 = CONTENT_WIDTH - LABEL_WIDTH;

const CHAR_WIDTH_FACTOR: f32 = 0.5;
const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 10.0;
const FOOTER_SIZE: f32 = 8.0;
const LINE_HEIGHT: f32 = 14.0;
const MAX_FIELD_CHARS: usize = 100;
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Text {
        x: f32,
        y: f32,
        size: f32,
        font: Font,
        text: String,
    },
    Rule {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Page {
    pub ops: Vec<Op>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Table {
        heading: String,
        rows: Vec<(String, String)>,
    },
    Text {
        heading: String,
        body: String,
    },
}

/// Point-in-time view of everything a rendered report shows.
pub struct RenderInput<'a> {
    pub report: &'a Report,
    pub project: Option<&'a Project>,
    pub inspector: Option<&'a User>,
    pub generated_at: DateTime<Utc>,
}

pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * CHAR_WIDTH_FACTOR
}

/// Greedy word wrap. Words wider than a line are split; blank input yields
/// no lines. Explicit newlines start a new line.
pub fn wrap_text(text: &str, max_width: f32, size: f32) -> Vec<String> {
    let max_chars = ((max_width / (size * CHAR_WIDTH_FACTOR)).floor() as usize).max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > max_chars {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let needed = if line.is_empty() {
                word.len()
            } else {
                line.chars().count() + 1 + word.len()
            };
            if needed > max_chars {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.extend(word);
        }

        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines
}

pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

pub fn format_extension(value: &ExtensionValue) -> String {
    match value {
        ExtensionValue::Bool(true) => "Yes".to_string(),
        ExtensionValue::Bool(false) => "No".to_string(),
        ExtensionValue::Number(n) => format_number(*n),
        ExtensionValue::Text(s) => truncate(s, MAX_FIELD_CHARS),
        ExtensionValue::List(items) => truncate(&items.join(", "), MAX_FIELD_CHARS),
    }
}

/// `permitNumber` / `permit_number` -> `Permit Number`
pub fn humanize_key(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for c in key.chars() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if c.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
            current.push(c);
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn or_na(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn header_block(report: &Report) -> Block {
    let mut rows = vec![
        ("Report ID".to_string(), report.id.clone()),
        ("Status".to_string(), report.status.as_str().to_string()),
        ("Author".to_string(), or_na(Some(&report.author))),
        ("Job".to_string(), or_na(Some(&report.job_name))),
        ("Inspection Type".to_string(), or_na(Some(&report.inspection_type))),
        ("Created".to_string(), timestamp(report.created_at)),
        ("Last Modified".to_string(), timestamp(report.updated_at)),
    ];
    if let Some(edited_at) = report.edited_at {
        rows.push(("Edited By".to_string(), or_na(report.edited_by.as_deref())));
        rows.push(("Edited At".to_string(), timestamp(edited_at)));
    }
    Block::Table {
        heading: report.title.clone(),
        rows,
    }
}

fn project_block(project: Option<&Project>) -> Block {
    let rows = match project {
        None => vec![("Project".to_string(), NOT_AVAILABLE.to_string())],
        Some(p) => vec![
            ("Name".to_string(), p.name.clone()),
            ("Location".to_string(), or_na(p.location.as_deref())),
            ("Client".to_string(), or_na(p.client_name.as_deref())),
            (
                "Start Date".to_string(),
                p.start_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ),
            (
                "End Date".to_string(),
                p.end_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ),
            (
                "Contract Day".to_string(),
                p.contract_day
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ),
            ("Description".to_string(), or_na(p.description.as_deref())),
        ],
    };
    Block::Table {
        heading: "Project Information".to_string(),
        rows,
    }
}

fn inspector_block(inspector: Option<&User>) -> Block {
    let rows = match inspector {
        None => vec![("Inspector".to_string(), NOT_AVAILABLE.to_string())],
        Some(u) => vec![
            ("Name".to_string(), u.name.clone()),
            ("Email".to_string(), u.email.clone()),
            ("Job Title".to_string(), or_na(u.job_name.as_deref())),
            ("Role".to_string(), u.role.as_str().replace('_', " ")),
        ],
    };
    Block::Table {
        heading: "Inspector Information".to_string(),
        rows,
    }
}

fn weather_block(report: &Report) -> Option<Block> {
    let weather = report.weather.as_ref()?;
    let measure = |value: Option<f64>, unit: &str| {
        value
            .map(|v| format!("{}{unit}", format_number(v)))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    };

    Some(Block::Table {
        heading: "Weather Conditions".to_string(),
        rows: vec![
            ("Conditions".to_string(), or_na(weather.conditions.as_deref())),
            ("Temperature".to_string(), measure(weather.temperature, " °C")),
            ("Humidity".to_string(), measure(weather.humidity, "%")),
            ("Wind Speed".to_string(), measure(weather.wind_speed, " km/h")),
            ("Location".to_string(), or_na(weather.location.as_deref())),
            (
                "Recorded".to_string(),
                weather
                    .recorded_at
                    .map(timestamp)
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ),
        ],
    })
}

fn text_block(heading: &str, body: &str) -> Block {
    Block::Text {
        heading: heading.to_string(),
        body: if body.trim().is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            body.to_string()
        },
    }
}

fn additional_fields_block(report: &Report) -> Option<Block> {
    let mut rows = Vec::new();

    if !report.labor.is_empty() {
        let labor = report
            .labor
            .iter()
            .map(|r| {
                format!(
                    "{} x{} ({}h)",
                    r.position,
                    format_number(r.quantity),
                    format_number(r.hours)
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        rows.push(("Labor".to_string(), labor));
    }

    if !report.equipment.is_empty() {
        let equipment = report
            .equipment
            .iter()
            .map(|r| {
                format!(
                    "{} x{} ({}h)",
                    r.equipment,
                    format_number(r.quantity),
                    format_number(r.hours)
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        rows.push(("Equipment".to_string(), equipment));
    }

    for (key, value) in &report.extensions {
        rows.push((humanize_key(key), format_extension(value)));
    }

    if rows.is_empty() {
        return None;
    }
    Some(Block::Table {
        heading: "Additional Information".to_string(),
        rows,
    })
}

/// Sections in their fixed order.
pub fn blocks(input: &RenderInput<'_>) -> Vec<Block> {
    let report = input.report;
    let mut blocks = vec![
        header_block(report),
        project_block(input.project),
        inspector_block(input.inspector),
    ];
    blocks.extend(weather_block(report));
    blocks.push(text_block("Report Content", &report.content));
    blocks.push(text_block("Findings", &report.findings));
    blocks.push(text_block("Recommendations", &report.recommendations));
    blocks.extend(additional_fields_block(report));
    blocks
}

struct Cursor {
    pages: Vec<Page>,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn page(&mut self) -> &mut Page {
        // pages is never empty
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height < BOTTOM_LIMIT {
            self.new_page();
        }
    }

    fn text(&mut self, x: f32, size: f32, font: Font, text: impl Into<String>) {
        let y = self.y;
        self.page().ops.push(Op::Text {
            x,
            y,
            size,
            font,
            text: text.into(),
        });
    }

    fn rule(&mut self) {
        let y = self.y;
        self.page().ops.push(Op::Rule {
            x1: MARGIN,
            y1: y,
            x2: PAGE_WIDTH - MARGIN,
            y2: y,
        });
    }

    fn heading(&mut self, heading: &str) {
        // keep the heading together with its first line
        self.ensure_space(HEADING_SIZE + 8.0 + LINE_HEIGHT * 2.0);
        self.y -= HEADING_SIZE;
        for line in wrap_text(heading, CONTENT_WIDTH, HEADING_SIZE) {
            self.text(MARGIN, HEADING_SIZE, Font::Bold, line);
            self.y -= HEADING_SIZE + 4.0;
        }
        self.y -= 4.0;
    }

    fn table(&mut self, rows: &[(String, String)]) {
        let label_chars = (LABEL_WIDTH / (BODY_SIZE * CHAR_WIDTH_FACTOR)) as usize - 1;
        for (label, value) in rows {
            let mut lines = wrap_text(value, VALUE_WIDTH - 6.0, BODY_SIZE);
            if lines.is_empty() {
                lines.push(NOT_AVAILABLE.to_string());
            }
            let label = truncate(label, label_chars);

            // short rows stay on one page; tall rows break per line
            self.ensure_space((lines.len() as f32 * LINE_HEIGHT + 4.0).min(LINE_HEIGHT * 4.0));
            self.y -= BODY_SIZE;
            self.text(MARGIN, BODY_SIZE, Font::Bold, label.clone());
            for (i, line) in lines.into_iter().enumerate() {
                if i > 0 {
                    if self.y - LINE_HEIGHT < BOTTOM_LIMIT {
                        self.new_page();
                        self.y -= BODY_SIZE;
                        self.text(
                            MARGIN,
                            BODY_SIZE,
                            Font::Bold,
                            truncate(&format!("{label} (cont.)"), label_chars),
                        );
                    } else {
                        self.y -= LINE_HEIGHT;
                    }
                }
                self.text(MARGIN + LABEL_WIDTH, BODY_SIZE, Font::Regular, line);
            }
            self.y -= 4.0;
            self.rule();
            self.y -= 4.0;
        }
        self.y -= 10.0;
    }

    fn paragraph(&mut self, body: &str) {
        for line in wrap_text(body, CONTENT_WIDTH, BODY_SIZE) {
            self.ensure_space(LINE_HEIGHT);
            self.y -= LINE_HEIGHT;
            self.text(MARGIN, BODY_SIZE, Font::Regular, line);
        }
        self.y -= 14.0;
    }

    fn finish(mut self, footer: &str) -> Vec<Page> {
        let total = self.pages.len();
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.ops.push(Op::Text {
                x: MARGIN,
                y: MARGIN - 20.0,
                size: FOOTER_SIZE,
                font: Font::Regular,
                text: format!("{footer} | Page {} of {total}", i + 1),
            });
        }
        self.pages
    }
}

pub fn layout(input: &RenderInput<'_>) -> Document {
    let mut cursor = Cursor::new();

    cursor.y -= TITLE_SIZE;
    cursor.text(MARGIN, TITLE_SIZE, Font::Bold, "Construction Inspection Report");
    cursor.y -= 8.0;
    cursor.rule();
    cursor.y -= 16.0;

    for block in blocks(input) {
        match block {
            Block::Table { heading, rows } => {
                cursor.heading(&heading);
                cursor.table(&rows);
            }
            Block::Text { heading, body } => {
                cursor.heading(&heading);
                cursor.paragraph(&body);
            }
        }
    }

    let footer = format!(
        "Generated {} | Report {}",
        timestamp(input.generated_at),
        input.report.id
    );

    Document {
        title: input.report.title.clone(),
        pages: cursor.finish(&footer),
    }
}
