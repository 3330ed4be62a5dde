/*!
 * Inline markup canonicalization.
 *
 * Cue text is stored in a small canonical vocabulary: `<b>`, `<i>`, `<u>`
 * and `<br>`, with `&amp;`, `&lt;` and `&gt;` escaped everywhere else. This
 * module converts native inline syntax (HTML-like tags, SSA override codes,
 * SBV `[br]` markers, TTML spans) into that vocabulary, and renders canonical
 * text back into native syntax through a `MarkupMapping`.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::xml::{Element, XmlNode, decode_entities, entity_at, escape_text};

static TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9:._-]*)([^<>]*)>").expect("Invalid tag regex")
});

static SSA_BLOCK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^}]*)\}").expect("Invalid SSA block regex"));

static SSA_STYLE_CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\([biu])(\d+)").expect("Invalid SSA style code regex"));

static MULTIPLE_SPACES_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2,}").expect("Invalid whitespace regex"));

/// One of the three styling constructs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Bold,
    Italic,
    Underline,
}

impl Style {
    fn tag(&self) -> &'static str {
        match self {
            Self::Bold => "b",
            Self::Italic => "i",
            Self::Underline => "u",
        }
    }

    fn from_tag(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "b" => Some(Self::Bold),
            "i" => Some(Self::Italic),
            "u" => Some(Self::Underline),
            _ => None,
        }
    }
}

/// Parsed canonical markup
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    /// Unescaped character data
    Text(String),
    Styled(Style, Vec<MarkupNode>),
    LineBreak,
}

/// Native inline syntax accepted by `to_canonical`
#[derive(Debug, Clone, Copy)]
pub enum NativeMarkup<'a> {
    /// HTML-like tags with newlines as line breaks (SRT, WebVTT, TXT)
    Html(&'a str),
    /// SSA/ASS override codes and `\N` breaks
    Ssa(&'a str),
    /// SBV text with `[br]` breaks
    Sbv(&'a str),
    /// A TTML `<p>` element
    Ttml(&'a Element),
}

/// Styling resolved for a TTML span or named style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl SpanStyle {
    fn from_attributes(el: &Element) -> Self {
        Self {
            bold: el.attr("fontWeight") == Some("bold"),
            italic: el.attr("fontStyle") == Some("italic"),
            underline: el.attr("textDecoration") == Some("underline"),
        }
    }

    fn merge(&mut self, other: SpanStyle) {
        self.bold |= other.bold;
        self.italic |= other.italic;
        self.underline |= other.underline;
    }

    pub fn is_plain(&self) -> bool {
        !(self.bold || self.italic || self.underline)
    }
}

/// Document level table of named TTML styles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleMap {
    styles: HashMap<String, SpanStyle>,
}

impl StyleMap {
    /// Scan the `<styling>` section of a TTML document
    pub fn from_document(root: &Element) -> Self {
        let mut styles = HashMap::new();
        for styling in root.descendants("styling") {
            for style in styling.descendants("style") {
                if let Some(id) = style.attr("id") {
                    let resolved = SpanStyle::from_attributes(style);
                    if !resolved.is_plain() {
                        styles.insert(id.to_string(), resolved);
                    }
                }
            }
        }
        Self { styles }
    }

    pub fn insert(&mut self, id: &str, style: SpanStyle) {
        self.styles.insert(id.to_string(), style);
    }

    pub fn get(&self, id: &str) -> Option<SpanStyle> {
        self.styles.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Inline attributes plus every referenced named style
    pub fn resolve(&self, el: &Element) -> SpanStyle {
        let mut resolved = SpanStyle::from_attributes(el);
        if let Some(refs) = el.attr("style") {
            for id in refs.split_whitespace() {
                if let Some(named) = self.get(id) {
                    resolved.merge(named);
                }
            }
        }
        resolved
    }
}

/// Templates turning canonical markup into a native syntax.
///
/// Style templates contain one `{}` placeholder for the styled content. A
/// missing template drops that styling and keeps the text; a missing
/// `linebreaks` entry renders breaks as `\n`.
#[derive(Debug, Clone, Default)]
pub struct MarkupMapping {
    pub bold: Option<String>,
    pub italics: Option<String>,
    pub underline: Option<String>,
    pub linebreaks: Option<String>,
    pub quote_text: Option<fn(&str) -> String>,
}

impl MarkupMapping {
    /// HTML-like tags, as written by SRT. Angle brackets in the text are
    /// escaped so they cannot read back as tags.
    pub fn html() -> Self {
        Self {
            bold: Some("<b>{}</b>".to_string()),
            italics: Some("<i>{}</i>".to_string()),
            underline: Some("<u>{}</u>".to_string()),
            linebreaks: Some("\n".to_string()),
            quote_text: Some(escape_tag_chars),
        }
    }

    /// HTML-like tags with text escaping
    pub fn webvtt() -> Self {
        Self {
            quote_text: Some(escape_text),
            ..Self::html()
        }
    }

    pub fn ssa() -> Self {
        Self {
            bold: Some(r"{\b1}{}{\b0}".to_string()),
            italics: Some(r"{\i1}{}{\i0}".to_string()),
            underline: Some(r"{\u1}{}{\u0}".to_string()),
            linebreaks: Some(r"\N".to_string()),
            quote_text: None,
        }
    }

    /// Only line breaks survive, written as `[br]`
    pub fn sbv() -> Self {
        Self {
            linebreaks: Some("[br]".to_string()),
            quote_text: Some(escape_tag_chars),
            ..Self::default()
        }
    }

    /// Plain text with newline breaks
    pub fn plain() -> Self {
        Self {
            linebreaks: Some("\n".to_string()),
            ..Self::default()
        }
    }

    /// Every style mapped to its bare content
    pub fn stripped() -> Self {
        Self {
            bold: Some("{}".to_string()),
            italics: Some("{}".to_string()),
            underline: Some("{}".to_string()),
            linebreaks: Some("\n".to_string()),
            quote_text: None,
        }
    }

    fn template(&self, style: Style) -> Option<&str> {
        match style {
            Style::Bold => self.bold.as_deref(),
            Style::Italic => self.italics.as_deref(),
            Style::Underline => self.underline.as_deref(),
        }
    }
}

/// Escape `<` and `>` always, and `&` only where it would otherwise read
/// back as an entity, so `Fish & chips` stays readable
pub fn escape_tag_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (idx, c) in text.char_indices() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' if entity_at(&text[idx..]).is_some() => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Remove control characters other than newline, carriage return and tab
pub fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            matches!(c, '\n' | '\r' | '\t') || !(c.is_control() || c == '\u{feff}')
        })
        .collect()
}

// Builds a tree from a flat stream of text, open, close and break events.
// Stray closers are ignored; tags still open at the end are closed.
struct TreeBuilder {
    stack: Vec<(Option<Style>, Vec<MarkupNode>)>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![(None, Vec::new())],
        }
    }

    fn current(&mut self) -> &mut Vec<MarkupNode> {
        let top = self.stack.len() - 1;
        &mut self.stack[top].1
    }

    fn text(&mut self, text: &str, newline_breaks: bool) {
        if !newline_breaks {
            push_text(self.current(), text);
            return;
        }
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        for (idx, line) in text.split('\n').enumerate() {
            if idx > 0 {
                self.current().push(MarkupNode::LineBreak);
            }
            push_text(self.current(), line);
        }
    }

    fn line_break(&mut self) {
        self.current().push(MarkupNode::LineBreak);
    }

    fn open(&mut self, style: Style) {
        self.stack.push((Some(style), Vec::new()));
    }

    fn close(&mut self, style: Style) {
        if !self.stack.iter().skip(1).any(|(s, _)| *s == Some(style)) {
            return;
        }
        while self.stack.len() > 1 {
            let popped = self.pop_frame();
            if popped == Some(style) {
                break;
            }
        }
    }

    fn pop_frame(&mut self) -> Option<Style> {
        let (style, children) = self.stack.pop()?;
        if let Some(s) = style {
            if !children.is_empty() {
                self.current().push(MarkupNode::Styled(s, children));
            }
        }
        style
    }

    fn finish(mut self) -> Vec<MarkupNode> {
        while self.stack.len() > 1 {
            self.pop_frame();
        }
        self.stack.pop().map(|(_, nodes)| nodes).unwrap_or_default()
    }
}

fn push_text(nodes: &mut Vec<MarkupNode>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(MarkupNode::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(MarkupNode::Text(text.to_string()));
    }
}

fn parse_tagged(text: &str, newline_breaks: bool) -> Vec<MarkupNode> {
    let mut builder = TreeBuilder::new();
    let mut last = 0;
    for caps in TAG_REGEX.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        builder.text(&decode_entities(&text[last..whole.start()]), newline_breaks);
        last = whole.end();

        let closing = &caps[1] == "/";
        let name = &caps[2];
        if name.eq_ignore_ascii_case("br") {
            builder.line_break();
        } else if let Some(style) = Style::from_tag(name) {
            let self_closing = caps[3].trim_end().ends_with('/');
            if closing {
                builder.close(style);
            } else if !self_closing {
                builder.open(style);
            }
        }
    }
    builder.text(&decode_entities(&text[last..]), newline_breaks);
    builder.finish()
}

/// Tolerant parse of canonical markup. Unknown tags are dropped with their
/// content kept; raw newlines stay part of the text.
pub fn parse_canonical(text: &str) -> Vec<MarkupNode> {
    parse_tagged(text, false)
}

/// Write nodes back as canonical markup
pub fn render_canonical(nodes: &[MarkupNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            MarkupNode::Text(t) => out.push_str(&escape_text(t)),
            MarkupNode::LineBreak => out.push_str("<br>"),
            MarkupNode::Styled(style, children) => {
                out.push('<');
                out.push_str(style.tag());
                out.push('>');
                out.push_str(&render_canonical(children));
                out.push_str("</");
                out.push_str(style.tag());
                out.push('>');
            }
        }
    }
    out
}

/// Normalize text that claims to be canonical markup
pub fn sanitize_canonical(text: &str) -> String {
    render_canonical(&parse_canonical(&strip_control_chars(text)))
}

/// Convert native inline syntax to canonical markup
pub fn to_canonical(native: NativeMarkup<'_>, style_map: &StyleMap) -> String {
    let nodes = match native {
        NativeMarkup::Html(text) => parse_tagged(&strip_control_chars(text), true),
        NativeMarkup::Sbv(text) => {
            parse_tagged(&strip_control_chars(text).replace("[br]", "\n"), true)
        }
        NativeMarkup::Ssa(text) => parse_canonical(&ssa_to_tagged(&strip_control_chars(text))),
        NativeMarkup::Ttml(el) => {
            let mut nodes = ttml_nodes(el, style_map);
            trim_lines(&mut nodes);
            prune(&mut nodes);
            nodes
        }
    };
    render_canonical(&nodes)
}

// Override blocks become canonical tags; everything else is literal text
fn ssa_to_tagged(text: &str) -> String {
    let mut out = String::new();
    let mut last = 0;
    for caps in SSA_BLOCK_REGEX.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&escape_text(&text[last..whole.start()]));
        last = whole.end();
        for code in SSA_STYLE_CODE_REGEX.captures_iter(&caps[1]) {
            let tag = &code[1];
            if &code[2] == "0" {
                out.push_str(&format!("</{}>", tag));
            } else {
                out.push_str(&format!("<{}>", tag));
            }
        }
    }
    out.push_str(&escape_text(&text[last..]));
    out.replace("\\N", "<br>")
        .replace("\\n", "<br>")
        .replace("\\h", " ")
}

// Tabs and line feeds vanish, runs of whitespace collapse to one space
fn normalize_xml_whitespace(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !matches!(c, '\n' | '\t' | '\r'))
        .collect();
    MULTIPLE_SPACES_REGEX.replace_all(&stripped, " ").into_owned()
}

fn ttml_nodes(el: &Element, style_map: &StyleMap) -> Vec<MarkupNode> {
    let mut nodes = Vec::new();
    for child in &el.children {
        match child {
            XmlNode::Text(text) => {
                push_text(&mut nodes, &normalize_xml_whitespace(&strip_control_chars(text)))
            }
            XmlNode::Element(child) => match child.local_name() {
                "br" => nodes.push(MarkupNode::LineBreak),
                "span" => {
                    let style = style_map.resolve(child);
                    let mut inner = ttml_nodes(child, style_map);
                    if style.is_plain() {
                        for node in inner {
                            match node {
                                MarkupNode::Text(t) => push_text(&mut nodes, &t),
                                other => nodes.push(other),
                            }
                        }
                        continue;
                    }
                    for (enabled, s) in [
                        (style.underline, Style::Underline),
                        (style.italic, Style::Italic),
                        (style.bold, Style::Bold),
                    ] {
                        if enabled {
                            inner = vec![MarkupNode::Styled(s, inner)];
                        }
                    }
                    nodes.extend(inner);
                }
                _ => nodes.extend(ttml_nodes(child, style_map)),
            },
        }
    }
    shift_trailing_spaces(&mut nodes);
    nodes
}

// A styled span ending in whitespace gives that whitespace to the next run,
// so `<i>hey, </i>you` reads `<i>hey,</i> you`. Several adjacent spans can
// still end up with misplaced spaces.
fn shift_trailing_spaces(nodes: &mut Vec<MarkupNode>) {
    let mut idx = 0;
    while idx + 1 < nodes.len() {
        let trimmed = match &mut nodes[idx] {
            MarkupNode::Styled(_, children) => trim_trailing(children, false),
            _ => false,
        };
        if trimmed {
            match &mut nodes[idx + 1] {
                MarkupNode::Text(next) if next.starts_with(char::is_whitespace) => {}
                MarkupNode::Text(next) => next.insert(0, ' '),
                _ => nodes.insert(idx + 1, MarkupNode::Text(" ".to_string())),
            }
        }
        idx += 1;
    }
}

// Returns true when whitespace was removed from the end of the run.
// With `all` set, keeps trimming through leaves that become empty.
fn trim_trailing(nodes: &mut [MarkupNode], all: bool) -> bool {
    for node in nodes.iter_mut().rev() {
        match node {
            MarkupNode::Text(t) => {
                let kept = t.trim_end().len();
                let changed = kept != t.len();
                t.truncate(kept);
                if !t.is_empty() || !all {
                    return changed;
                }
            }
            MarkupNode::Styled(_, children) => {
                let changed = trim_trailing(children, all);
                if !all || has_content(children) {
                    return changed;
                }
            }
            MarkupNode::LineBreak => return false,
        }
    }
    false
}

fn trim_leading(nodes: &mut [MarkupNode]) {
    for node in nodes.iter_mut() {
        match node {
            MarkupNode::Text(t) => {
                *t = t.trim_start().to_string();
                if !t.is_empty() {
                    return;
                }
            }
            MarkupNode::Styled(_, children) => {
                trim_leading(children);
                if has_content(children) {
                    return;
                }
            }
            MarkupNode::LineBreak => return,
        }
    }
}

fn has_content(nodes: &[MarkupNode]) -> bool {
    nodes.iter().any(|node| match node {
        MarkupNode::Text(t) => !t.is_empty(),
        MarkupNode::Styled(_, children) => has_content(children),
        MarkupNode::LineBreak => true,
    })
}

// Trim each top level line
fn trim_lines(nodes: &mut [MarkupNode]) {
    let mut start = 0;
    for idx in 0..=nodes.len() {
        if idx == nodes.len() || nodes[idx] == MarkupNode::LineBreak {
            trim_leading(&mut nodes[start..idx]);
            trim_trailing(&mut nodes[start..idx], true);
            start = idx + 1;
        }
    }
}

fn prune(nodes: &mut Vec<MarkupNode>) {
    nodes.retain_mut(|node| match node {
        MarkupNode::Text(t) => !t.is_empty(),
        MarkupNode::Styled(_, children) => {
            prune(children);
            !children.is_empty()
        }
        MarkupNode::LineBreak => true,
    });
}

fn render_mapped(nodes: &[MarkupNode], mapping: &MarkupMapping, out: &mut String) {
    for node in nodes {
        match node {
            MarkupNode::Text(t) => match mapping.quote_text {
                Some(quote) => out.push_str(&quote(t)),
                None => out.push_str(t),
            },
            MarkupNode::LineBreak => {
                out.push_str(mapping.linebreaks.as_deref().unwrap_or("\n"))
            }
            MarkupNode::Styled(style, children) => {
                let mut inner = String::new();
                render_mapped(children, mapping, &mut inner);
                match mapping.template(*style) {
                    Some(template) => out.push_str(&template.replacen("{}", &inner, 1)),
                    None => out.push_str(&inner),
                }
            }
        }
    }
}

/// Render canonical markup through a mapping table
pub fn from_canonical(text: &str, mapping: &MarkupMapping) -> String {
    let mut out = String::new();
    render_mapped(&parse_canonical(text), mapping, &mut out);
    out
}

/// Canonical markup with tags removed, entities decoded and breaks as `\n`
pub fn plain_text(text: &str) -> String {
    from_canonical(text, &MarkupMapping::plain())
}
