//! DOM-walking HTML to Markdown conversion

use crate::config::MarkdownConfig;
use crate::render::RenderedPage;
use scraper::{ElementRef, Html};
use url::Url;

/// Options controlling Markdown output
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Drop images entirely instead of emitting image syntax
    pub strip_images: bool,

    /// Convert cross-host anchors to plain text
    pub strip_external_links: bool,

    /// Convert same-host anchors to plain text
    pub strip_internal_links: bool,

    /// Tags whose subtrees are dropped entirely
    pub excluded_tags: Vec<String>,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self::from(&MarkdownConfig::default())
    }
}

impl From<&MarkdownConfig> for MarkdownOptions {
    fn from(config: &MarkdownConfig) -> Self {
        Self {
            strip_images: config.strip_images,
            strip_external_links: config.strip_external_links,
            strip_internal_links: config.strip_internal_links,
            excluded_tags: config.excluded_tags.clone(),
        }
    }
}

/// Converts a rendered page to normalized Markdown
///
/// The page URL is the base for deciding whether an anchor is internal or
/// external (same host or not). Runs of 3+ blank lines are collapsed to
/// exactly one and trailing whitespace is trimmed per line.
pub fn to_markdown(page: &RenderedPage, options: &MarkdownOptions) -> String {
    let document = Html::parse_document(&page.html);
    let base = Url::parse(&page.url).ok();

    let mut writer = Writer::new(options, base.as_ref());
    writer.children(document.root_element());

    normalize_blank_lines(&writer.out)
}

/// Marker kind for one list level
#[derive(Clone, Copy)]
enum ListKind {
    Bullet,
    Numbered(u32),
}

struct Writer<'a> {
    options: &'a MarkdownOptions,
    base: Option<&'a Url>,
    out: String,
}

impl<'a> Writer<'a> {
    fn new(options: &'a MarkdownOptions, base: Option<&'a Url>) -> Self {
        Self {
            options,
            base,
            out: String::new(),
        }
    }

    /// Walks an element's children, emitting text and dispatching elements
    fn children(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                self.text(text);
            } else if let Some(el) = ElementRef::wrap(child) {
                self.element(el);
            }
        }
    }

    fn element(&mut self, el: ElementRef<'_>) {
        let name = el.value().name();

        if self.options.excluded_tags.iter().any(|tag| tag.as_str() == name) {
            return;
        }

        match name {
            // Document plumbing carries no readable content
            "head" | "title" | "meta" | "link" | "base" => {}

            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => self.heading(el, name),
            "p" => {
                let content = collapse_inline(&self.capture(el));
                self.block(&content);
            }
            "br" => self.out.push('\n'),
            "hr" => self.block("---"),
            "pre" => self.code_block(el),
            "blockquote" => self.blockquote(el),
            "ul" => self.list(el, ListKind::Bullet),
            "ol" => {
                let start = el
                    .value()
                    .attr("start")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(1);
                self.list(el, ListKind::Numbered(start));
            }
            "table" => self.table(el),
            "a" => self.link(el),
            "img" => self.image(el),
            "em" | "i" => self.wrapped(el, "*"),
            "strong" | "b" => self.wrapped(el, "**"),
            "del" | "s" | "strike" => self.wrapped(el, "~~"),
            "code" | "kbd" | "samp" => self.inline_code(el),

            // Generic block containers
            "html" | "body" | "div" | "section" | "article" | "main" | "figure" | "figcaption"
            | "details" | "summary" | "dl" | "dt" | "dd" | "address" | "li" => {
                let content = self.capture(el);
                self.block(content.trim());
            }

            // Everything else is treated as transparent inline markup
            _ => self.children(el),
        }
    }

    /// Renders an element's children into a fresh buffer
    fn capture(&self, el: ElementRef<'_>) -> String {
        let mut sub = Writer::new(self.options, self.base);
        sub.children(el);
        sub.out
    }

    /// Appends a block, separated from prior output by one blank line
    fn block(&mut self, content: &str) {
        let content = content.trim();
        if content.is_empty() {
            return;
        }

        if !self.out.is_empty() {
            while !self.out.ends_with("\n\n") {
                self.out.push('\n');
            }
        }
        self.out.push_str(content);
    }

    fn heading(&mut self, el: ElementRef<'_>, name: &str) {
        let level: usize = name[1..].parse().unwrap_or(1);
        let content = collapse_inline(&self.capture(el));
        if !content.is_empty() {
            self.block(&format!("{} {}", "#".repeat(level), content));
        }
    }

    fn blockquote(&mut self, el: ElementRef<'_>) {
        let content = self.capture(el);
        let content = content.trim();
        if content.is_empty() {
            return;
        }

        let quoted: Vec<String> = content
            .lines()
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", line)
                }
            })
            .collect();
        self.block(&quoted.join("\n"));
    }

    fn code_block(&mut self, el: ElementRef<'_>) {
        let text: String = el.text().collect();
        let text = text.trim_matches('\n');
        if text.trim().is_empty() {
            return;
        }

        let language = el
            .children()
            .filter_map(ElementRef::wrap)
            .find(|child| child.value().name() == "code")
            .and_then(|code| code.value().attr("class"))
            .and_then(|class| {
                class
                    .split_whitespace()
                    .find_map(|c| c.strip_prefix("language-").or_else(|| c.strip_prefix("lang-")))
            })
            .unwrap_or("");

        self.block(&format!("```{}\n{}\n```", language, text));
    }

    fn inline_code(&mut self, el: ElementRef<'_>) {
        let code: String = el.text().collect();
        let code = collapse_inline(&code);
        if !code.is_empty() {
            self.out.push('`');
            self.out.push_str(&code);
            self.out.push('`');
        }
    }

    fn list(&mut self, el: ElementRef<'_>, kind: ListKind) {
        let mut counter = match kind {
            ListKind::Bullet => 0,
            ListKind::Numbered(start) => start,
        };

        let mut items = Vec::new();
        for child in el.children().filter_map(ElementRef::wrap) {
            if child.value().name() != "li" {
                continue;
            }

            let content = self.capture(child);
            let content = content.trim();
            if content.is_empty() {
                continue;
            }

            let marker = match kind {
                ListKind::Bullet => "- ".to_string(),
                ListKind::Numbered(_) => {
                    let marker = format!("{}. ", counter);
                    counter += 1;
                    marker
                }
            };
            let indent = " ".repeat(marker.len());

            let mut lines = content.lines();
            let mut item = format!("{}{}", marker, lines.next().unwrap_or(""));
            for line in lines {
                item.push('\n');
                if !line.is_empty() {
                    item.push_str(&indent);
                    item.push_str(line);
                }
            }
            items.push(item);
        }

        if !items.is_empty() {
            self.block(&items.join("\n"));
        }
    }

    fn table(&mut self, el: ElementRef<'_>) {
        let mut rows: Vec<Vec<String>> = Vec::new();

        for tr in el
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|e| e.value().name() == "tr")
        {
            let cells: Vec<String> = tr
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|c| matches!(c.value().name(), "th" | "td"))
                .map(|cell| collapse_inline(&self.capture(cell)).replace('|', "\\|"))
                .collect();

            if !cells.is_empty() {
                rows.push(cells);
            }
        }

        if rows.is_empty() {
            return;
        }

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut lines = Vec::with_capacity(rows.len() + 1);
        for (index, row) in rows.iter().enumerate() {
            let mut padded = row.clone();
            padded.resize(width, String::new());
            lines.push(format!("| {} |", padded.join(" | ")));

            if index == 0 {
                lines.push(format!("|{}", " --- |".repeat(width)));
            }
        }

        self.block(&lines.join("\n"));
    }

    fn link(&mut self, el: ElementRef<'_>) {
        let text = collapse_inline(&self.capture(el));
        let href = el.value().attr("href").unwrap_or("").trim();

        if href.is_empty() || !self.keep_link(href) {
            self.out.push_str(&text);
            return;
        }

        let label = if text.is_empty() { href } else { text.as_str() };
        self.out.push_str(&format!("[{}]({})", label, href));
    }

    /// Decides whether an anchor survives as a Markdown link
    ///
    /// External means the href resolves to a different host than the page;
    /// relative and fragment hrefs are internal by definition.
    fn keep_link(&self, href: &str) -> bool {
        if href.starts_with('#') {
            return !self.options.strip_internal_links;
        }

        let external = match Url::parse(href) {
            Ok(absolute) => match self.base {
                Some(base) => absolute.host_str() != base.host_str(),
                None => true,
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => false,
            Err(_) => false,
        };

        if external {
            !self.options.strip_external_links
        } else {
            !self.options.strip_internal_links
        }
    }

    fn image(&mut self, el: ElementRef<'_>) {
        if self.options.strip_images {
            return;
        }

        let Some(src) = el.value().attr("src") else {
            return;
        };
        let alt = el.value().attr("alt").unwrap_or("");
        self.out.push_str(&format!("![{}]({})", alt, src));
    }

    fn wrapped(&mut self, el: ElementRef<'_>, mark: &str) {
        let content = collapse_inline(&self.capture(el));
        if !content.is_empty() {
            self.out.push_str(mark);
            self.out.push_str(&content);
            self.out.push_str(mark);
        }
    }

    /// Emits a text node, collapsing horizontal whitespace while keeping
    /// line structure (single newline stays a break, 2+ become a blank line)
    fn text(&mut self, text: &str) {
        let mut rest = text;
        while !rest.is_empty() {
            match rest.find(char::is_whitespace) {
                Some(pos) => {
                    self.out.push_str(&rest[..pos]);
                    let after = &rest[pos..];
                    let end = after
                        .find(|c: char| !c.is_whitespace())
                        .unwrap_or(after.len());
                    self.whitespace_run(&after[..end]);
                    rest = &after[end..];
                }
                None => {
                    self.out.push_str(rest);
                    break;
                }
            }
        }
    }

    fn whitespace_run(&mut self, run: &str) {
        let newlines = run.matches('\n').count();
        if newlines >= 2 {
            self.out.push_str("\n\n");
        } else if newlines == 1 {
            self.out.push('\n');
            // keep indentation after the break so list/code layout survives
            if let Some(pos) = run.rfind('\n') {
                self.out.push_str(&run[pos + 1..]);
            }
        } else {
            self.out.push(' ');
        }
    }
}

/// Collapses all whitespace runs to single spaces
fn collapse_inline(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trims trailing spaces per line and collapses runs of 3+ blank lines to
/// exactly one blank line
fn normalize_blank_lines(input: &str) -> String {
    let lines: Vec<&str> = input.lines().map(str::trim_end).collect();

    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    let mut index = 0;
    while index < lines.len() {
        if lines[index].is_empty() {
            let mut next = index;
            while next < lines.len() && lines[next].is_empty() {
                next += 1;
            }
            let blanks = next - index;
            let emit = if blanks >= 3 { 1 } else { blanks };
            for _ in 0..emit {
                kept.push("");
            }
            index = next;
        } else {
            kept.push(lines[index]);
            index += 1;
        }
    }

    let joined = kept.join("\n");
    let trimmed = joined.trim_matches('\n').trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}\n", trimmed)
    }
}
