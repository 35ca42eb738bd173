// src/stages/svg.rs

//! SVG minification that keeps `viewBox`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::errors::{PipelineError, Result};
use crate::stages::{Asset, Stage};

/// Namespace prefixes written by vector editors; never needed for rendering.
const EDITOR_PREFIXES: &[&[u8]] = &[b"sodipodi", b"inkscape", b"sketch", b"serif"];

/// Elements removed together with their content.
const DROPPED_ELEMENTS: &[&[u8]] = &[b"metadata"];

/// Drops the XML declaration, doctype, comments, processing instructions,
/// `<metadata>`, editor-namespaced elements and attributes, and whitespace-only
/// text. Attributes are otherwise left alone, so `viewBox` always survives.
#[derive(Debug, Clone, Default)]
pub struct SvgMinifier;

impl SvgMinifier {
    pub fn new() -> Self {
        Self
    }

    pub fn minify(&self, input: &[u8]) -> std::result::Result<Vec<u8>, String> {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(false);
        let mut writer = Writer::new(Vec::with_capacity(input.len()));
        let mut buf = Vec::new();
        // Depth inside an element being dropped.
        let mut skip_depth = 0usize;

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| format!("invalid SVG at byte {}: {e}", reader.buffer_position()))?;

            match event {
                Event::Eof => break,
                Event::Start(e) => {
                    if skip_depth > 0 || is_dropped_element(e.name().as_ref()) {
                        skip_depth += 1;
                    } else {
                        let start = filtered_start(&e, |key| !is_editor_attr(key))?;
                        write(&mut writer, Event::Start(start))?;
                    }
                }
                Event::End(e) => {
                    if skip_depth > 0 {
                        skip_depth -= 1;
                    } else {
                        write(&mut writer, Event::End(e))?;
                    }
                }
                Event::Empty(e) => {
                    if skip_depth == 0 && !is_dropped_element(e.name().as_ref()) {
                        let start = filtered_start(&e, |key| !is_editor_attr(key))?;
                        write(&mut writer, Event::Empty(start))?;
                    }
                }
                Event::Text(t) => {
                    if skip_depth == 0 && !t.iter().all(u8::is_ascii_whitespace) {
                        write(&mut writer, Event::Text(t))?;
                    }
                }
                Event::CData(c) => {
                    if skip_depth == 0 {
                        write(&mut writer, Event::CData(c))?;
                    }
                }
                // Declaration, doctype, comments, processing instructions.
                _ => {}
            }
            buf.clear();
        }

        Ok(writer.into_inner())
    }
}

impl Stage for SvgMinifier {
    fn name(&self) -> &'static str {
        "svgmin"
    }

    fn apply(&self, asset: Asset) -> Result<Asset> {
        let contents = self
            .minify(&asset.contents)
            .map_err(|e| PipelineError::stage(self.name(), &asset.relative, e))?;
        Ok(Asset { contents, ..asset })
    }
}

/// Copy a start tag, keeping only attributes whose raw name passes `keep`.
pub(crate) fn filtered_start(
    e: &BytesStart<'_>,
    keep: impl Fn(&[u8]) -> bool,
) -> std::result::Result<BytesStart<'static>, String> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut out = BytesStart::new(name);
    for attr in e.attributes() {
        let attr = attr.map_err(|e| format!("malformed attribute: {e}"))?;
        if keep(attr.key.as_ref()) {
            out.push_attribute(attr);
        }
    }
    Ok(out)
}

pub(crate) fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> std::result::Result<(), String> {
    writer
        .write_event(event)
        .map_err(|e| format!("writing SVG: {e}"))
}

fn prefix_of(name: &[u8]) -> Option<&[u8]> {
    name.iter().position(|&b| b == b':').map(|i| &name[..i])
}

fn local_of(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(i) => &name[i + 1..],
        None => name,
    }
}

fn is_dropped_element(name: &[u8]) -> bool {
    DROPPED_ELEMENTS.contains(&local_of(name))
        || prefix_of(name).is_some_and(|p| EDITOR_PREFIXES.contains(&p))
}

/// `inkscape:label`, `sodipodi:docname`, `xmlns:inkscape`, ...
pub(crate) fn is_editor_attr(key: &[u8]) -> bool {
    match prefix_of(key) {
        Some(b"xmlns") => EDITOR_PREFIXES.contains(&local_of(key)),
        Some(prefix) => EDITOR_PREFIXES.contains(&prefix),
        None => false,
    }
}
