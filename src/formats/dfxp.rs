/*!
 * TTML and DFXP adapters.
 *
 * Both flavors share one reader. Elements are matched by local name so
 * documents using the current TTML namespace, the legacy DFXP namespaces or
 * no namespace at all are read the same way. Each `<div>` is a paragraph:
 * its first `<p>` starts a new paragraph in the track.
 *
 * The writers differ in how styling and timing are expressed: DFXP puts
 * `tts:` attributes on each span and writes `begin`/`end`, TTML references
 * named styles and writes `begin`/`dur`.
 *
 * `merge_tracks` writes several languages into one DFXP document and
 * `split_merged_tracks` reads them back apart.
 */

use log::{debug, warn};

use crate::errors::{ParseError, TimeError};
use crate::formats::SubtitleAdapter;
use crate::language_utils::to_bcp47;
use crate::markup::{MarkupNode, NativeMarkup, Style, StyleMap, parse_canonical, to_canonical};
use crate::subtitle_track::{AppendOptions, REGION_TOP, SubtitleTrack};
use crate::time_expression::{ClockFormat, parse_time_expression};
use crate::xml::{Element, escape_attr, escape_text, parse_document};

const TTML_NAMESPACE: &str = "http://www.w3.org/ns/ttml";
const TTS_NAMESPACE: &str = "http://www.w3.org/ns/ttml#styling";
const TTM_NAMESPACE: &str = "http://www.w3.org/ns/ttml#metadata";
const TTP_NAMESPACE: &str = "http://www.w3.org/ns/ttml#parameter";

/// Look of the generated document's default style and regions
#[derive(Debug, Clone, PartialEq)]
pub struct TtmlLayout {
    pub style_id: String,
    pub region_id: String,
    pub color: String,
    pub font_family: String,
    pub font_size: String,
    pub text_align: String,
    pub background_color: String,
    pub extent: String,
    pub padding: String,
    /// Title written when the track has none
    pub default_title: String,
    /// Description written when the track has none
    pub default_description: String,
}

impl Default for TtmlLayout {
    fn default() -> Self {
        Self {
            style_id: "default-style".to_string(),
            region_id: "subtitle-area".to_string(),
            color: "white".to_string(),
            font_family: "proportionalSansSerif".to_string(),
            font_size: "18px".to_string(),
            text_align: "center".to_string(),
            background_color: "black".to_string(),
            extent: "560px 62px".to_string(),
            padding: "5px 3px".to_string(),
            default_title: String::new(),
            default_description: String::new(),
        }
    }
}

/// How the writer expresses styling and timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Dfxp,
    Ttml,
}

impl Flavor {
    fn name(&self) -> &'static str {
        match self {
            Self::Dfxp => "dfxp",
            Self::Ttml => "ttml",
        }
    }

    fn style_attribute(&self, style: Style) -> &'static str {
        match (self, style) {
            (Self::Dfxp, Style::Bold) => r#"tts:fontWeight="bold""#,
            (Self::Dfxp, Style::Italic) => r#"tts:fontStyle="italic""#,
            (Self::Dfxp, Style::Underline) => r#"tts:textDecoration="underline""#,
            (Self::Ttml, Style::Bold) => r#"style="strong""#,
            (Self::Ttml, Style::Italic) => r#"style="emphasis""#,
            (Self::Ttml, Style::Underline) => r#"style="underlined""#,
        }
    }
}

/// DFXP: inline span attributes, `begin`/`end` timing
#[derive(Debug, Clone, Default)]
pub struct DfxpAdapter {
    pub layout: TtmlLayout,
}

/// TTML: named styles, `begin`/`dur` timing
#[derive(Debug, Clone, Default)]
pub struct TtmlAdapter {
    pub layout: TtmlLayout,
}

impl DfxpAdapter {
    pub fn new(layout: TtmlLayout) -> Self {
        Self { layout }
    }
}

impl TtmlAdapter {
    pub fn new(layout: TtmlLayout) -> Self {
        Self { layout }
    }
}

impl SubtitleAdapter for DfxpAdapter {
    fn file_types(&self) -> &'static [&'static str] {
        &["dfxp"]
    }

    fn parse(&self, raw: &str, language_code: &str) -> Result<SubtitleTrack, ParseError> {
        parse_ttml(raw, language_code, Flavor::Dfxp.name())
    }

    fn generate(&self, track: &SubtitleTrack, language_code: &str) -> String {
        generate_ttml(track, language_code, &self.layout, Flavor::Dfxp)
    }
}

impl SubtitleAdapter for TtmlAdapter {
    fn file_types(&self) -> &'static [&'static str] {
        &["ttml"]
    }

    fn parse(&self, raw: &str, language_code: &str) -> Result<SubtitleTrack, ParseError> {
        parse_ttml(raw, language_code, Flavor::Ttml.name())
    }

    fn generate(&self, track: &SubtitleTrack, language_code: &str) -> String {
        generate_ttml(track, language_code, &self.layout, Flavor::Ttml)
    }
}

// Reading

fn read_time(
    el: &Element,
    attr: &str,
    tick_rate: Option<u32>,
    format: &str,
) -> Result<Option<u64>, ParseError> {
    match el.attr(attr).map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => parse_time_expression(value, tick_rate)
            .map(Some)
            .map_err(|e| ParseError::time(format, e)),
        None => Ok(None),
    }
}

/// Begin and end of a `<p>`, with `dur` turned into an absolute end
fn read_timing(p: &Element, tick_rate: Option<u32>, format: &str) -> Result<(Option<u64>, Option<u64>), ParseError> {
    let begin = read_time(p, "begin", tick_rate, format)?;
    let mut end = read_time(p, "end", tick_rate, format)?;
    if end.is_none() {
        if let (Some(b), Some(dur)) = (begin, read_time(p, "dur", tick_rate, format)?) {
            end = Some(b.checked_add(dur).ok_or_else(|| {
                ParseError::time(format, TimeError::Overflow(format!("{} + {}", b, dur)))
            })?);
        }
    }
    let begin = begin.and_then(|ms| ClockFormat::TTML.resolve(ms));
    let end = end.and_then(|ms| ClockFormat::TTML.resolve(ms));
    Ok((begin, end))
}

fn first_text(root: &Element, local: &str) -> Option<String> {
    root.descendants(local)
        .first()
        .map(|el| el.text_content().trim().to_string())
        .filter(|text| !text.is_empty())
}

// Paragraph groups in document order: each run of `<p>` siblings is one
// group, and nested divs are walked where they appear
fn collect_paragraphs<'a>(container: &'a Element, groups: &mut Vec<Vec<&'a Element>>) {
    let mut current: Vec<&Element> = Vec::new();
    for child in container.child_elements() {
        match child.local_name() {
            "p" => current.push(child),
            "div" => {
                if !current.is_empty() {
                    groups.push(std::mem::take(&mut current));
                }
                collect_paragraphs(child, groups);
            }
            _ => {}
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
}

// Root `<tt>` element and its `<body>`
fn read_document(raw: &str, format: &str) -> Result<Element, ParseError> {
    let root = parse_document(raw)
        .map_err(|e| ParseError::caused_by(format, "invalid XML document", e))?;
    if root.local_name() != "tt" {
        return Err(ParseError::malformed(
            format,
            format!("expected <tt> root, found <{}>", root.name),
        ));
    }
    if root.child("body").is_none() {
        return Err(ParseError::malformed(format, "document has no <body>"));
    }
    Ok(root)
}

fn read_tick_rate(root: &Element, format: &str) -> Result<Option<u32>, ParseError> {
    match root.attr("tickRate") {
        Some(value) => Ok(Some(value.trim().parse::<u32>().map_err(|e| {
            ParseError::caused_by(format, format!("invalid tickRate '{}'", value), e)
        })?)),
        None => Ok(None),
    }
}

// Appends every paragraph found under `container`
fn read_cues(
    track: &mut SubtitleTrack,
    container: &Element,
    tick_rate: Option<u32>,
    style_map: &StyleMap,
    format: &str,
) -> Result<(), ParseError> {
    let mut groups = Vec::new();
    collect_paragraphs(container, &mut groups);
    for group in groups {
        for (idx, p) in group.into_iter().enumerate() {
            let (begin, end) = read_timing(p, tick_rate, format)?;
            let region = match p.attr("region") {
                Some(REGION_TOP) => Some(REGION_TOP.to_string()),
                Some(other) => {
                    debug!("Ignoring TTML region '{}'", other);
                    None
                }
                None => None,
            };
            let text = to_canonical(NativeMarkup::Ttml(p), style_map);
            track.append_with(
                begin,
                end,
                &text,
                AppendOptions::canonical().paragraph(idx == 0).region(region),
            );
        }
    }
    Ok(())
}

fn parse_ttml(raw: &str, language_code: &str, format: &str) -> Result<SubtitleTrack, ParseError> {
    let root = read_document(raw, format)?;
    let tick_rate = read_tick_rate(&root, format)?;
    let style_map = StyleMap::from_document(&root);
    debug!("Loaded {} named styles", style_map.len());

    let mut track = SubtitleTrack::new(language_code);
    track.set_title(first_text(&root, "title"));
    track.set_description(first_text(&root, "description"));
    if let Some(body) = root.child("body") {
        read_cues(&mut track, body, tick_rate, &style_map, format)?;
    }

    if track.is_empty() {
        return Err(ParseError::no_subtitles(format));
    }
    debug!("Parsed {} {} paragraphs", track.len(), format);
    Ok(track)
}

/// Split a document written by `merge_tracks` back into one track per
/// language. Every `<div xml:lang>` directly under `<body>` becomes a track;
/// a language without paragraphs gives an empty track.
pub fn split_merged_tracks(raw: &str) -> Result<Vec<SubtitleTrack>, ParseError> {
    let format = Flavor::Dfxp.name();
    let root = read_document(raw, format)?;
    let tick_rate = read_tick_rate(&root, format)?;
    let style_map = StyleMap::from_document(&root);

    let mut tracks = Vec::new();
    if let Some(body) = root.child("body") {
        for div in body.child_elements().filter(|el| el.local_name() == "div") {
            let Some(lang) = div.attr("lang") else {
                warn!("Skipping merged DFXP div without xml:lang");
                continue;
            };
            let mut track = SubtitleTrack::new(lang);
            track.set_title(first_text(&root, "title"));
            track.set_description(first_text(&root, "description"));
            read_cues(&mut track, div, tick_rate, &style_map, format)?;
            tracks.push(track);
        }
    }

    if tracks.is_empty() {
        return Err(ParseError::no_subtitles(format));
    }
    debug!("Split merged DFXP into {} tracks", tracks.len());
    Ok(tracks)
}

// Writing

fn render_nodes(nodes: &[MarkupNode], flavor: Flavor, out: &mut String) {
    for node in nodes {
        match node {
            MarkupNode::Text(text) => out.push_str(&escape_text(text)),
            MarkupNode::LineBreak => out.push_str("<br/>"),
            MarkupNode::Styled(style, children) => {
                out.push_str("<span ");
                out.push_str(flavor.style_attribute(*style));
                out.push('>');
                render_nodes(children, flavor, out);
                out.push_str("</span>");
            }
        }
    }
}

fn timing_attributes(start: Option<u64>, end: Option<u64>, flavor: Flavor) -> String {
    let mut attrs = String::new();
    if let Some(s) = start {
        attrs.push_str(&format!(r#" begin="{}""#, ClockFormat::TTML.format(Some(s))));
    }
    match (flavor, start, end) {
        (Flavor::Ttml, Some(s), Some(e)) if e >= s => {
            attrs.push_str(&format!(r#" dur="{}""#, ClockFormat::TTML.format(Some(e - s))));
        }
        (_, _, Some(e)) => {
            attrs.push_str(&format!(r#" end="{}""#, ClockFormat::TTML.format(Some(e))));
        }
        _ => {}
    }
    attrs
}

fn bcp47_or_given(language_code: &str) -> String {
    to_bcp47(language_code).unwrap_or_else(|e| {
        warn!("Writing language code as given: {}", e);
        language_code.to_string()
    })
}

// XML declaration, `<tt>` start tag and the whole `<head>`
fn write_head(out: &mut String, lang: &str, title: &str, description: &str, layout: &TtmlLayout, flavor: Flavor) {
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<tt xmlns=\"{}\" xmlns:tts=\"{}\" xmlns:ttm=\"{}\" xmlns:ttp=\"{}\" xml:lang=\"{}\">\n",
        TTML_NAMESPACE,
        TTS_NAMESPACE,
        TTM_NAMESPACE,
        TTP_NAMESPACE,
        escape_attr(lang)
    ));
    out.push_str("    <head>\n");
    out.push_str("        <metadata>\n");
    out.push_str(&format!("            <ttm:title>{}</ttm:title>\n", escape_text(title)));
    out.push_str(&format!(
        "            <ttm:description>{}</ttm:description>\n",
        escape_text(description)
    ));
    out.push_str("            <ttm:copyright/>\n");
    out.push_str("        </metadata>\n");

    out.push_str("        <styling>\n");
    out.push_str(&format!(
        "            <style xml:id=\"{}\" tts:color=\"{}\" tts:fontFamily=\"{}\" tts:fontSize=\"{}\" tts:textAlign=\"{}\"/>\n",
        escape_attr(&layout.style_id),
        escape_attr(&layout.color),
        escape_attr(&layout.font_family),
        escape_attr(&layout.font_size),
        escape_attr(&layout.text_align)
    ));
    if flavor == Flavor::Ttml {
        out.push_str("            <style xml:id=\"strong\" tts:fontWeight=\"bold\"/>\n");
        out.push_str("            <style xml:id=\"emphasis\" tts:fontStyle=\"italic\"/>\n");
        out.push_str("            <style xml:id=\"underlined\" tts:textDecoration=\"underline\"/>\n");
    }
    out.push_str("        </styling>\n");

    out.push_str("        <layout>\n");
    for (id, align) in [(layout.region_id.as_str(), "after"), (REGION_TOP, "before")] {
        out.push_str(&format!(
            "            <region xml:id=\"{}\" style=\"{}\" tts:extent=\"{}\" tts:padding=\"{}\" tts:backgroundColor=\"{}\" tts:displayAlign=\"{}\"/>\n",
            escape_attr(id),
            escape_attr(&layout.style_id),
            escape_attr(&layout.extent),
            escape_attr(&layout.padding),
            escape_attr(&layout.background_color),
            align
        ));
    }
    out.push_str("        </layout>\n");
    out.push_str("    </head>\n");
}

// One `<div>` per paragraph. `id_prefix` keeps `xml:id`s unique when
// several tracks share a document.
fn write_paragraphs(out: &mut String, track: &SubtitleTrack, flavor: Flavor, indent: &str, id_prefix: &str) {
    let mut div_open = false;
    for (idx, item) in track.subtitle_items(None).into_iter().enumerate() {
        if item.meta.new_paragraph || !div_open {
            if div_open {
                out.push_str(&format!("{}</div>\n", indent));
            }
            out.push_str(&format!("{}<div>\n", indent));
            div_open = true;
        }
        let mut text = String::new();
        render_nodes(&parse_canonical(&item.text), flavor, &mut text);

        out.push_str(&format!("{}    <p xml:id=\"{}{}\"", indent, escape_attr(id_prefix), idx + 1));
        out.push_str(&timing_attributes(item.start_time, item.end_time, flavor));
        if item.meta.region.as_deref() == Some(REGION_TOP) {
            out.push_str(&format!(" region=\"{}\"", REGION_TOP));
        }
        out.push('>');
        out.push_str(&text);
        out.push_str("</p>\n");
    }
    if div_open {
        out.push_str(&format!("{}</div>\n", indent));
    } else {
        out.push_str(&format!("{}<div/>\n", indent));
    }
}

fn generate_ttml(track: &SubtitleTrack, language_code: &str, layout: &TtmlLayout, flavor: Flavor) -> String {
    let lang = bcp47_or_given(language_code);
    let title = track.title().unwrap_or(&layout.default_title);
    let description = track.description().unwrap_or(&layout.default_description);

    let mut out = String::new();
    write_head(&mut out, &lang, title, description, layout, flavor);
    out.push_str(&format!("    <body region=\"{}\">\n", escape_attr(&layout.region_id)));
    write_paragraphs(&mut out, track, flavor, "        ", "sub-");
    out.push_str("    </body>\n");
    out.push_str("</tt>\n");
    out
}

/// Write several tracks into one DFXP document. The root carries no
/// language; each track becomes a `<div xml:lang="...">` holding its
/// paragraphs, in the order given. Title and description come from the
/// first track that has them.
pub fn merge_tracks(tracks: &[SubtitleTrack], layout: &TtmlLayout) -> String {
    let title = tracks
        .iter()
        .find_map(|t| t.title())
        .unwrap_or(&layout.default_title);
    let description = tracks
        .iter()
        .find_map(|t| t.description())
        .unwrap_or(&layout.default_description);

    let mut out = String::new();
    write_head(&mut out, "", title, description, layout, Flavor::Dfxp);
    out.push_str(&format!("    <body region=\"{}\">\n", escape_attr(&layout.region_id)));
    for track in tracks {
        let lang = bcp47_or_given(track.language_code());
        out.push_str(&format!("        <div xml:lang=\"{}\">\n", escape_attr(&lang)));
        write_paragraphs(&mut out, track, Flavor::Dfxp, "            ", &format!("{}-", lang));
        out.push_str("        </div>\n");
    }
    out.push_str("    </body>\n");
    out.push_str("</tt>\n");
    debug!("Merged {} tracks into one DFXP document", tracks.len());
    out
}
