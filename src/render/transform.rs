//! Document tree to RTF transform.
//!
//! Walks the normalized tree and writes RTF: block elements become
//! paragraphs, inline elements become formatting groups, tables become RTF
//! rows sized by [`ColumnStats`](crate::rtf::ColumnStats). The body is then
//! placed in a [`Template`].

use std::borrow::Cow;
use std::collections::HashMap;

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::error::{Error, Result};
use crate::fetch::{Fetcher, NoFetch};
use crate::model::{Document, Element, Node};
use crate::rtf::{
    encode_code_point, encode_plain, encode_text, parse_declarations, resolve_class_styles,
    NormalizeMode, MARGIN_WIDTH,
};

use super::template::{Template, TemplateFields, PROTECTION_WORDS};
use super::{ConversionContext, NodeVisitor, RenderOptions, RenderResult, VisitorAction};

/// Heading font sizes in half-points, `h1` to `h6`.
const HEADING_SIZES: [u32; 6] = [48, 36, 28, 24, 20, 16];

/// Paragraph spacing after body paragraphs, in twips.
const PARAGRAPH_SPACING: &str = "\\sa120";

const CELL_BORDERS: &str = "\\clbrdrt\\brdrs\\brdrw10\\clbrdrl\\brdrs\\brdrw10\
\\clbrdrb\\brdrs\\brdrw10\\clbrdrr\\brdrs\\brdrw10";

/// Convert a document to RTF without external images.
pub fn to_rtf(doc: &Document, options: &RenderOptions) -> Result<String> {
    let images = HashMap::new();
    let mut transform = RtfTransform::new(options, &images, &NoFetch);
    Ok(transform.render(doc)?.content)
}

/// RTF transform for one or more documents.
///
/// Every call to [`render`](Self::render) uses a fresh
/// [`ConversionContext`].
pub struct RtfTransform<'a> {
    options: &'a RenderOptions,
    images: &'a HashMap<String, Vec<u8>>,
    fetcher: &'a dyn Fetcher,
    visitor: Option<&'a mut dyn NodeVisitor>,
    template: Option<Template>,
}

impl<'a> RtfTransform<'a> {
    /// Create a transform resolving images from `images`, then `fetcher`.
    pub fn new(
        options: &'a RenderOptions,
        images: &'a HashMap<String, Vec<u8>>,
        fetcher: &'a dyn Fetcher,
    ) -> Self {
        Self {
            options,
            images,
            fetcher,
            visitor: None,
            template: None,
        }
    }

    /// Customize output with a visitor.
    pub fn with_visitor(mut self, visitor: &'a mut dyn NodeVisitor) -> Self {
        self.visitor = Some(visitor);
        self
    }

    /// Use an already loaded template instead of the configured one.
    pub fn with_template(mut self, template: Template) -> Self {
        self.template = Some(template);
        self
    }

    /// Render a complete RTF document.
    pub fn render(&mut self, doc: &Document) -> Result<RenderResult> {
        let mut ctx = ConversionContext::new(doc.style_blocks(), self.images, self.fetcher);
        let body = self.render_body(doc, &mut ctx)?;

        let template = match (&self.template, &self.options.template) {
            (Some(template), _) => Cow::Borrowed(template),
            (None, Some(path)) => Cow::Owned(Template::from_file(path)?),
            (None, None) => Cow::Owned(Template::default()),
        };

        let title = self.options.title.clone().or_else(|| doc.title());
        let info = if self.options.include_info {
            let created = self
                .options
                .created
                .unwrap_or_else(|| chrono::Local::now().naive_local());
            info_group(title.as_deref(), self.options.author.as_deref(), created)
        } else {
            String::new()
        };
        let protection = if self.options.document_protected {
            PROTECTION_WORDS
        } else {
            ""
        };

        let content = template.render(&TemplateFields {
            body: &body,
            colour_table: ctx.colors.output(),
            protection,
            font_size: self.options.half_points(),
            info: &info,
        });

        log::debug!(
            "rendered {} bytes of RTF ({} colors, {} tables, {} images)",
            content.len(),
            ctx.stats.color_count,
            ctx.stats.table_count,
            ctx.stats.image_count
        );
        Ok(RenderResult::new(content, title, ctx.stats))
    }

    /// Render only the document body, accumulating into `ctx`.
    pub fn render_body(&mut self, doc: &Document, ctx: &mut ConversionContext<'_>) -> Result<String> {
        let mut writer = Writer {
            out: String::new(),
            ctx,
            options: self.options,
            visitor: self
                .visitor
                .as_deref_mut()
                .map(|v| v as &mut dyn NodeVisitor),
            lists: Vec::new(),
            pre_depth: 0,
            cell_depth: 0,
            pending: false,
            trim_next: true,
        };
        writer.element(doc.body());
        writer.break_paragraph();

        let body = writer.out;
        match group_balance(&body) {
            0 => Ok(body),
            n => Err(Error::Transform(format!(
                "unbalanced RTF groups in body ({:+})",
                n
            ))),
        }
    }
}

struct ListLevel {
    ordered: bool,
    counter: u32,
}

#[derive(Default)]
struct Formatting {
    paragraph: String,
    character: String,
}

struct Writer<'w, 'a> {
    out: String,
    ctx: &'w mut ConversionContext<'a>,
    options: &'w RenderOptions,
    visitor: Option<&'w mut dyn NodeVisitor>,
    lists: Vec<ListLevel>,
    pre_depth: usize,
    cell_depth: usize,
    /// Inline content written since the last paragraph break
    pending: bool,
    /// Drop leading whitespace of the next text run
    trim_next: bool,
}

impl Writer<'_, '_> {
    fn visit(&mut self, f: impl FnOnce(&mut dyn NodeVisitor) -> VisitorAction) -> VisitorAction {
        match self.visitor.as_deref_mut() {
            Some(visitor) => f(visitor),
            None => VisitorAction::Continue,
        }
    }

    fn raw(&mut self, rtf: &str) {
        self.out.push_str(rtf);
    }

    fn content(&mut self, rtf: &str) {
        self.out.push_str(rtf);
        self.pending = true;
        self.trim_next = false;
    }

    fn children(&mut self, children: &[Node]) {
        for (i, child) in children.iter().enumerate() {
            match child {
                Node::Text(text) => self.text(text, children.get(i + 1)),
                Node::Element(element) => self.element(element),
            }
        }
    }

    fn text(&mut self, text: &str, following: Option<&Node>) {
        match self.visit(|v| v.visit_text(text)) {
            VisitorAction::Continue => {}
            VisitorAction::Skip => return,
            VisitorAction::Replace(rtf) => return self.content(&rtf),
        }

        if self.pre_depth > 0 {
            if !text.is_empty() {
                self.content(&encode_text(following, text, NormalizeMode::Preformatted));
                // encoding already closed the paragraph before the following `p`
                if text.contains('\n') && following.is_some_and(|n| n.is_element("p")) {
                    self.pending = false;
                }
            }
            return;
        }

        let flat = text.replace(['\r', '\n', '\t'], " ");
        let run = if self.trim_next {
            flat.trim_start()
        } else {
            flat.as_str()
        };
        if !run.is_empty() {
            self.content(&encode_text(following, run, NormalizeMode::CollapseSpaces));
        }
    }

    fn element(&mut self, el: &Element) {
        if el.is_marker() {
            if let Some(code_point) = el.marker_code_point() {
                self.ctx.stats.special_char_count += 1;
                self.content(&encode_code_point(code_point));
            }
            return;
        }

        let tag = el.name.to_ascii_lowercase();
        let action = match tag.as_str() {
            "table" => self.visit(|v| v.visit_table(el)),
            "img" => {
                let src = el.attr("src").unwrap_or_default();
                let alt = el.attr("alt");
                self.visit(|v| v.visit_image(src, alt))
            }
            "a" => match el.attr("href") {
                Some(href) => self.visit(|v| v.visit_link(href, el)),
                None => VisitorAction::Continue,
            },
            _ => VisitorAction::Continue,
        };
        let action = match action {
            VisitorAction::Continue => self.visit(|v| v.visit_element(el)),
            other => other,
        };
        match action {
            VisitorAction::Continue => {}
            VisitorAction::Skip => return,
            VisitorAction::Replace(rtf) => return self.content(&rtf),
        }

        match tag.as_str() {
            "head" | "script" | "style" | "title" | "meta" | "link" | "noscript" | "template" => {}
            "html" | "body" => self.children(&el.children),
            "p" => {
                self.ctx.stats.paragraph_count += 1;
                self.block(el, PARAGRAPH_SPACING);
            }
            "div" | "section" | "article" | "header" | "footer" | "main" | "nav" | "aside"
            | "figure" | "figcaption" | "form" | "fieldset" | "address" | "details"
            | "summary" | "dt" => self.block(el, ""),
            "center" => self.block(el, "\\qc"),
            "blockquote" => self.block(el, "\\li720\\ri720\\sa120"),
            "dd" => self.block(el, "\\li720"),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => self.heading(el, &tag),
            "pre" | "listing" | "xmp" => self.preformatted(el),
            "ul" | "ol" | "menu" | "dir" => self.list(el, tag == "ol"),
            "li" => self.list_item(el),
            "hr" => self.rule(),
            "br" => {
                self.content("\\line ");
                self.trim_next = true;
            }
            "a" => self.link(el),
            "img" => self.image(el),
            "table" => self.table(el),
            "caption" => {}
            "input" => self.input(el),
            _ => {
                let fmt = self.formatting(el);
                let mut words = inline_words(&tag).unwrap_or_default().to_string();
                words.push_str(&fmt.character);
                self.group(&words, |w| w.children(&el.children));
            }
        }
    }

    fn group(&mut self, words: &str, inner: impl FnOnce(&mut Self)) {
        if words.is_empty() {
            return inner(self);
        }
        self.raw("{");
        self.raw(words);
        self.raw(" ");
        inner(self);
        self.raw("}");
    }

    fn break_paragraph(&mut self) {
        if self.pending && self.cell_depth == 0 {
            self.raw("\\par\n");
            self.pending = false;
        }
    }

    fn start_block(&mut self, props: &str) {
        self.trim_next = true;
        if self.cell_depth > 0 {
            if self.pending {
                self.raw("\\line ");
                self.pending = false;
            }
            return;
        }
        self.break_paragraph();
        self.raw("\\pard");
        self.raw(props);
        self.raw(" ");
    }

    fn block(&mut self, el: &Element, props: &str) {
        let fmt = self.formatting(el);
        self.start_block(&format!("{}{}", props, fmt.paragraph));
        self.group(&fmt.character, |w| w.children(&el.children));
        self.break_paragraph();
    }

    fn heading(&mut self, el: &Element, tag: &str) {
        let level = tag[1..].parse::<usize>().unwrap_or(1).clamp(1, 6);
        self.ctx.stats.heading_count += 1;

        let fmt = self.formatting(el);
        self.start_block(&format!("\\sb240\\sa120\\keepn{}", fmt.paragraph));
        let words = format!("\\b\\fs{}{}", HEADING_SIZES[level - 1], fmt.character);
        self.group(&words, |w| w.children(&el.children));
        self.break_paragraph();
    }

    fn preformatted(&mut self, el: &Element) {
        let fmt = self.formatting(el);
        self.start_block(&fmt.paragraph);
        self.pre_depth += 1;
        self.group(&format!("\\f2{}", fmt.character), |w| w.children(&el.children));
        self.pre_depth -= 1;
        self.break_paragraph();
    }

    fn list(&mut self, el: &Element, ordered: bool) {
        self.break_paragraph();
        let start = el
            .attr("start")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(1);
        self.lists.push(ListLevel {
            ordered,
            counter: start.saturating_sub(1),
        });
        let fmt = self.formatting(el);
        self.group(&fmt.character, |w| w.children(&el.children));
        self.lists.pop();
        self.break_paragraph();
    }

    fn list_item(&mut self, el: &Element) {
        self.ctx.stats.list_item_count += 1;
        let depth = self.lists.len().max(1) as u32;
        let marker = match self.lists.last_mut() {
            Some(level) if level.ordered => {
                level.counter = level.counter.saturating_add(1);
                format!("{}.\\tab ", level.counter)
            }
            _ => "\\bullet\\tab ".to_string(),
        };

        let fmt = self.formatting(el);
        self.start_block(&format!("\\fi-360\\li{}{}", 360 * (depth + 1), fmt.paragraph));
        self.content(&marker);
        self.trim_next = true;
        self.group(&fmt.character, |w| w.children(&el.children));
        self.break_paragraph();
    }

    fn rule(&mut self) {
        if self.cell_depth > 0 {
            return self.start_block("");
        }
        self.break_paragraph();
        self.raw("\\pard\\brdrb\\brdrs\\brdrw10\\brsp20 \\par\n");
        self.trim_next = true;
    }

    fn link(&mut self, el: &Element) {
        let Some(href) = el.attr("href").map(str::trim).filter(|h| !h.is_empty()) else {
            let fmt = self.formatting(el);
            return self.group(&fmt.character, |w| w.children(&el.children));
        };
        self.ctx.stats.link_count += 1;

        let fmt = self.formatting(el);
        let target = encode_plain(href).replace('"', "%22");
        self.content(&format!(
            "{{\\field{{\\*\\fldinst{{HYPERLINK \"{}\"}}}}{{\\fldrslt{{\\ul\\cf2{} ",
            target, fmt.character
        ));
        self.children(&el.children);
        self.raw("}}}");
    }

    fn image(&mut self, el: &Element) {
        if !self.options.embed_images {
            return;
        }
        let Some(src) = el.attr("src").map(str::trim).filter(|s| !s.is_empty()) else {
            return;
        };
        let width = el.attr("width").and_then(parse_dimension);
        let height = el.attr("height").and_then(parse_dimension);

        let picture = self.ctx.embed_image(src, width, height);
        if picture.is_empty() {
            return;
        }
        self.content("{\\pict ");
        self.raw(&picture);
        self.raw("}");
    }

    fn input(&mut self, el: &Element) {
        let kind = el.attr("type").unwrap_or("text").to_ascii_lowercase();
        if kind != "checkbox" && kind != "radio" {
            return;
        }
        let mut field = String::from(
            "{\\field{\\*\\fldinst FORMCHECKBOX {\\*\\formfield{\\fftype1\\ffres25\\ffhps20\\ffdefres",
        );
        field.push(if el.has_attr("checked") { '1' } else { '0' });
        field.push_str("}}}{\\fldrslt }}");
        self.content(&field);
    }

    fn table(&mut self, el: &Element) {
        self.ctx.stats.table_count += 1;
        let rows = table_rows(el);

        if self.cell_depth > 0 {
            return self.inline_table(&rows);
        }

        self.ctx
            .columns
            .compute_with_width(el, self.options.table_width);
        let column_count = rows.iter().map(|r| cells(r).len()).max().unwrap_or(0);
        let edges = self.column_edges(column_count);
        let bordered = el.attr("border").map_or(false, |b| b.trim() != "0");

        self.break_paragraph();
        if let Some(caption) = el.child_elements().find(|c| c.is("caption")) {
            self.raw("\\pard\\qc ");
            self.trim_next = true;
            self.group("\\i", |w| w.children(&caption.children));
            self.raw("\\par\n");
        }

        for row in rows {
            let row_cells = cells(row);
            if row_cells.is_empty() {
                continue;
            }
            self.raw(&format!("\\trowd\\trgaph{}\\trleft0", MARGIN_WIDTH));
            for edge in &edges[..row_cells.len()] {
                if bordered {
                    self.raw(CELL_BORDERS);
                }
                self.raw(&format!("\\cellx{}", edge));
            }
            self.raw("\n");

            for cell in row_cells {
                let fmt = self.formatting(cell);
                self.raw(&format!("\\pard\\intbl{} ", fmt.paragraph));
                self.cell_depth += 1;
                self.pending = false;
                self.trim_next = true;
                let words = if cell.is("th") {
                    format!("\\b{}", fmt.character)
                } else {
                    fmt.character
                };
                self.group(&words, |w| w.children(&cell.children));
                self.cell_depth -= 1;
                self.raw("\\cell ");
            }
            self.raw("\\row\n");
        }

        self.raw("\\pard\n");
        self.pending = false;
        self.trim_next = true;
    }

    /// Right edges of the first `count` columns. Columns the statistics do
    /// not cover get a minimal width.
    fn column_edges(&self, count: usize) -> Vec<u32> {
        let mode = self.options.width_mode.cumulative();
        let minimum = (2 * MARGIN_WIDTH).saturating_add(self.options.font_size.saturating_mul(8));
        let mut edges = Vec::with_capacity(count);
        let mut previous = 0;
        for column in 1..=count {
            let edge = self
                .ctx
                .columns
                .column_width(column, mode, self.options.font_size);
            previous = if edge > previous {
                edge
            } else {
                previous.saturating_add(minimum)
            };
            edges.push(previous);
        }
        edges
    }

    fn inline_table(&mut self, rows: &[&Element]) {
        for (r, row) in rows.iter().enumerate() {
            if r > 0 || self.pending {
                self.content("\\line ");
            }
            for (c, cell) in cells(row).into_iter().enumerate() {
                if c > 0 {
                    self.content("\\tab ");
                }
                self.trim_next = true;
                self.children(&cell.children);
            }
        }
        self.trim_next = true;
    }

    fn formatting(&mut self, el: &Element) -> Formatting {
        let mut fmt = Formatting::default();

        if let Some(align) = el.attr("align").and_then(alignment) {
            fmt.paragraph.push_str(align);
        }
        if el.is("font") {
            if let Some(color) = el.attr("color") {
                let index = self.ctx.color_index(color.trim());
                if index > 0 {
                    fmt.character.push_str(&format!("\\cf{}", index));
                }
            }
        }

        let mut styles = String::new();
        if let Some(classes) = el.attr("class") {
            for class in classes.split(' ').filter(|c| !c.is_empty()) {
                let body = resolve_class_styles(class, self.ctx.style_blocks());
                if !body.is_empty() {
                    styles.push_str(&body);
                    styles.push(';');
                }
            }
        }
        if let Some(inline) = el.attr("style") {
            styles.push_str(inline);
        }

        for (property, value) in parse_declarations(&styles) {
            let lower = value.to_ascii_lowercase();
            match property.as_str() {
                "font-weight" => {
                    let heavy = lower.parse::<u32>().is_ok_and(|w| w >= 600);
                    if heavy || lower == "bold" || lower == "bolder" {
                        fmt.character.push_str("\\b");
                    } else if lower == "normal" {
                        fmt.character.push_str("\\b0");
                    }
                }
                "font-style" => {
                    if lower == "italic" || lower == "oblique" {
                        fmt.character.push_str("\\i");
                    } else if lower == "normal" {
                        fmt.character.push_str("\\i0");
                    }
                }
                "text-decoration" | "text-decoration-line" => {
                    if lower.contains("underline") {
                        fmt.character.push_str("\\ul");
                    }
                    if lower.contains("line-through") {
                        fmt.character.push_str("\\strike");
                    }
                    if lower == "none" {
                        fmt.character.push_str("\\ulnone\\strike0");
                    }
                }
                "border-bottom" | "border-bottom-style" => {
                    if lower.contains("dotted") {
                        fmt.character.push_str("\\uld");
                    } else if lower.contains("dashed") {
                        fmt.character.push_str("\\uldash");
                    }
                }
                "color" => {
                    let index = self.ctx.color_index(&value);
                    if index > 0 {
                        fmt.character.push_str(&format!("\\cf{}", index));
                    }
                }
                "background-color" | "background" => {
                    let index = self.ctx.color_index(&value);
                    if index > 0 {
                        fmt.character.push_str(&format!("\\highlight{}", index));
                    }
                }
                "font-size" => {
                    if let Some(half_points) = font_size_half_points(&lower) {
                        fmt.character.push_str(&format!("\\fs{}", half_points));
                    }
                }
                "font-family" => {
                    if lower.contains("mono") || lower.contains("courier") {
                        fmt.character.push_str("\\f2");
                    }
                }
                "text-align" => {
                    if let Some(align) = alignment(&lower) {
                        fmt.paragraph.push_str(align);
                    }
                }
                _ => {}
            }
        }

        fmt
    }
}

fn inline_words(tag: &str) -> Option<&'static str> {
    match tag {
        "b" | "strong" => Some("\\b"),
        "i" | "em" | "cite" | "var" | "dfn" => Some("\\i"),
        "u" | "ins" => Some("\\ul"),
        "s" | "strike" | "del" => Some("\\strike"),
        "sub" => Some("\\sub"),
        "sup" => Some("\\super"),
        "code" | "tt" | "kbd" | "samp" => Some("\\f2"),
        _ => None,
    }
}

fn alignment(value: &str) -> Option<&'static str> {
    match value.trim().to_ascii_lowercase().as_str() {
        "left" => Some("\\ql"),
        "center" => Some("\\qc"),
        "right" => Some("\\qr"),
        "justify" => Some("\\qj"),
        _ => None,
    }
}

/// `12pt` or `16px` to half-points.
fn font_size_half_points(value: &str) -> Option<u32> {
    let (number, factor) = if let Some(pt) = value.strip_suffix("pt") {
        (pt, 2.0)
    } else if let Some(px) = value.strip_suffix("px") {
        (px, 1.5)
    } else {
        return None;
    };
    let size: f64 = number.trim().parse().ok()?;
    let half_points = (size * factor).round();
    (half_points >= 1.0).then_some(half_points as u32)
}

/// Pixel size from a `width`/`height` attribute: its leading digits, so
/// `80` and `80px` both give 80. Percentages are not pixel sizes.
fn parse_dimension(value: &str) -> Option<u32> {
    let value = value.trim();
    if value.ends_with('%') {
        return None;
    }
    let digits: String = value.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn table_rows(table: &Element) -> Vec<&Element> {
    let mut rows = Vec::new();
    for child in table.child_elements() {
        if child.is("tr") {
            rows.push(child);
        } else if child.is("thead") || child.is("tbody") || child.is("tfoot") {
            rows.extend(child.child_elements().filter(|e| e.is("tr")));
        }
    }
    rows
}

fn cells(row: &Element) -> Vec<&Element> {
    row.child_elements()
        .filter(|c| c.is("td") || c.is("th"))
        .collect()
}

fn info_group(title: Option<&str>, author: Option<&str>, created: NaiveDateTime) -> String {
    let mut info = String::from("{\\info");
    if let Some(title) = title {
        info.push_str(&format!("{{\\title {}}}", encode_plain(title)));
    }
    if let Some(author) = author {
        info.push_str(&format!("{{\\author {}}}", encode_plain(author)));
    }
    info.push_str(&format!(
        "{{\\creatim\\yr{}\\mo{}\\dy{}\\hr{}\\min{}}}",
        created.year(),
        created.month(),
        created.day(),
        created.hour(),
        created.minute()
    ));
    info.push_str("}\n");
    info
}

/// Open minus closed groups, ignoring escaped braces.
fn group_balance(rtf: &str) -> i64 {
    let mut depth = 0i64;
    let mut chars = rtf.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
    }
    depth
}
