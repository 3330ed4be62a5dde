/*!
 * Minimal XML tree reader.
 *
 * Only what the XML based subtitle formats need: elements, attributes,
 * character data, CDATA sections and character/entity references. Comments,
 * processing instructions and doctype declarations are skipped. Namespaces
 * are not resolved; lookups match on local names so `tt:p` and `p` are the
 * same element, which also covers the legacy DFXP namespaces.
 */

use crate::errors::XmlError;

/// A node in the element tree
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
}

/// An XML element with its attributes and children in document order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Qualified name as written, e.g. `tts:fontWeight` or `p`
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

/// Strip a namespace prefix
pub fn local_name(qualified: &str) -> &str {
    qualified.rsplit(':').next().unwrap_or(qualified)
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Attribute value looked up by local name, ignoring any prefix
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| local_name(name) == local)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements, skipping text
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// First direct child with the given local name
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.child_elements().find(|el| el.local_name() == local)
    }

    /// All descendants with the given local name, in document order
    pub fn descendants(&self, local: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_descendants(local, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, local: &str, found: &mut Vec<&'a Element>) {
        for child in self.child_elements() {
            if child.local_name() == local {
                found.push(child);
            }
            child.collect_descendants(local, found);
        }
    }

    /// Concatenated character data of the element and its descendants
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                XmlNode::Text(t) => text.push_str(t),
                XmlNode::Element(el) => text.push_str(&el.text_content()),
            }
        }
        text
    }
}

/// Parse a document and return its root element
pub fn parse_document(input: &str) -> Result<Element, XmlError> {
    let mut reader = Reader {
        src: input.trim_start_matches('\u{feff}'),
        pos: 0,
    };
    reader.skip_misc()?;
    if reader.at_end() {
        return Err(XmlError::NoRoot);
    }
    if !reader.rest().starts_with('<') {
        return Err(reader.syntax("text before root element"));
    }
    reader.parse_element()
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn syntax(&self, message: &str) -> XmlError {
        XmlError::Syntax {
            offset: self.pos,
            message: message.to_string(),
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn skip_past(&mut self, terminator: &str) -> Result<(), XmlError> {
        match self.rest().find(terminator) {
            Some(idx) => {
                self.pos += idx + terminator.len();
                Ok(())
            }
            None => Err(XmlError::UnexpectedEof),
        }
    }

    // Whitespace, comments, processing instructions and doctype before the root
    fn skip_misc(&mut self) -> Result<(), XmlError> {
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.starts_with("<?") {
                self.skip_past("?>")?;
            } else if rest.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if rest.starts_with("<!") {
                self.skip_past(">")?;
            } else {
                return Ok(());
            }
        }
    }

    fn read_name(&mut self) -> Result<&'a str, XmlError> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| c.is_whitespace() || c == '/' || c == '>' || c == '=')
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.syntax("expected a name"));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn expect(&mut self, token: char) -> Result<(), XmlError> {
        if self.rest().starts_with(token) {
            self.pos += token.len_utf8();
            Ok(())
        } else if self.at_end() {
            Err(XmlError::UnexpectedEof)
        } else {
            Err(self.syntax(&format!("expected '{}'", token)))
        }
    }

    fn parse_element(&mut self) -> Result<Element, XmlError> {
        self.expect('<')?;
        let mut element = Element::new(self.read_name()?);

        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.starts_with("/>") {
                self.pos += 2;
                return Ok(element);
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break;
            }
            if self.at_end() {
                return Err(XmlError::UnexpectedEof);
            }
            let name = self.read_name()?;
            self.skip_whitespace();
            self.expect('=')?;
            self.skip_whitespace();
            let quote = match self.rest().chars().next() {
                Some(q @ ('"' | '\'')) => q,
                Some(_) => return Err(self.syntax("attribute value must be quoted")),
                None => return Err(XmlError::UnexpectedEof),
            };
            self.pos += 1;
            let rest = self.rest();
            let end = rest.find(quote).ok_or(XmlError::UnexpectedEof)?;
            element
                .attributes
                .push((name.to_string(), decode_entities(&rest[..end])));
            self.pos += end + 1;
        }

        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return Err(XmlError::UnexpectedEof);
            }
            if rest.starts_with("</") {
                let offset = self.pos;
                self.pos += 2;
                let found = self.read_name()?;
                if found != element.name {
                    return Err(XmlError::MismatchedTag {
                        offset,
                        expected: element.name,
                        found: found.to_string(),
                    });
                }
                self.skip_whitespace();
                self.expect('>')?;
                return Ok(element);
            } else if rest.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if let Some(body) = rest.strip_prefix("<![CDATA[") {
                let end = body.find("]]>").ok_or(XmlError::UnexpectedEof)?;
                push_text(&mut element, body[..end].to_string());
                self.pos += "<![CDATA[".len() + end + 3;
            } else if rest.starts_with("<?") {
                self.skip_past("?>")?;
            } else if rest.starts_with('<') {
                let child = self.parse_element()?;
                element.children.push(XmlNode::Element(child));
            } else {
                let end = rest.find('<').unwrap_or(rest.len());
                push_text(&mut element, decode_entities(&rest[..end]));
                self.pos += end;
            }
        }
    }
}

// Adjacent character data (text followed by CDATA) is merged into one node
fn push_text(element: &mut Element, text: String) {
    if let Some(XmlNode::Text(last)) = element.children.last_mut() {
        last.push_str(&text);
    } else {
        element.children.push(XmlNode::Text(text));
    }
}

/// Resolve character references and the common named entities.
/// Unknown references are left untouched.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match entity_at(candidate) {
            Some((c, end)) => {
                out.push(c);
                rest = &candidate[end + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decode the entity reference `candidate` starts with, returning the
/// character and the index of the closing `;`
pub(crate) fn entity_at(candidate: &str) -> Option<(char, usize)> {
    candidate
        .find(';')
        .filter(|&end| end > 1 && end <= 10)
        .and_then(|end| resolve_entity(&candidate[1..end]).map(|c| (c, end)))
}

fn resolve_entity(name: &str) -> Option<char> {
    if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(dec) = name.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

/// Escape text for element content
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape text for a double-quoted attribute value
pub fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}
