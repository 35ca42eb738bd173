// src/stages/sprite.rs

use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};
use regex::Regex;

use crate::errors::{PipelineError, Result};
use crate::stages::svg::{filtered_start, is_editor_attr, write};
use crate::stages::Asset;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const DOCTYPE: &str = r#"<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">"#;

/// Root attributes carried over onto each `<symbol>`.
const SYMBOL_ATTRS: &[&[u8]] = &[b"viewBox", b"preserveAspectRatio"];

/// Merges SVG icons into one sprite of `<symbol>` fragments.
///
/// Each icon becomes `<symbol id="<file stem>">` with the icon's `viewBox`.
/// Attributes whose whole name matches `remove_attrs` are stripped from
/// every element so the sprite picks up colours from the consuming
/// stylesheet. `(stroke|fill)` removes `stroke` but keeps `stroke-width`.
#[derive(Debug, Clone)]
pub struct SpriteBuilder {
    remove_attrs: Regex,
    inline: bool,
}

impl SpriteBuilder {
    pub fn new(remove_attrs: &str, inline: bool) -> Result<Self> {
        let remove_attrs = Regex::new(&format!("^(?:{remove_attrs})$")).map_err(|e| {
            PipelineError::ConfigError(format!("invalid sprite remove_attrs regex: {e}"))
        })?;
        Ok(Self {
            remove_attrs,
            inline,
        })
    }

    /// Merge `icons` into one SVG document. Symbol ids must be unique.
    pub fn merge(&self, icons: &[Asset]) -> Result<Vec<u8>> {
        let mut ids: HashSet<String> = HashSet::new();
        let mut namespaces: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();
        let mut body = Writer::new(Vec::new());

        for icon in icons {
            let id = icon
                .relative
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            if id.is_empty() {
                return Err(PipelineError::stage(
                    "svgstore",
                    &icon.relative,
                    "icon has no file name to derive a symbol id from",
                ));
            }
            if !ids.insert(id.clone()) {
                return Err(PipelineError::stage(
                    "svgstore",
                    &icon.relative,
                    format!("duplicate symbol id '{id}'; icon file names must be unique"),
                ));
            }

            self.append_symbol(&mut body, &id, &icon.contents, &mut namespaces)
                .map_err(|e| PipelineError::stage("svgstore", &icon.relative, e))?;
        }

        let mut out = Writer::new(Vec::new());
        if !self.inline {
            out.get_mut().extend_from_slice(XML_DECL.as_bytes());
            out.get_mut().extend_from_slice(DOCTYPE.as_bytes());
        }

        let mut root = BytesStart::new("svg");
        root.push_attribute(("xmlns", SVG_NS));
        for (key, value) in &namespaces {
            root.push_attribute(Attribute {
                key: QName(key.as_slice()),
                value: Cow::Borrowed(value.as_slice()),
            });
        }

        let to_stage_err = |e: String| PipelineError::stage("svgstore", "sprite", e);
        write(&mut out, Event::Start(root)).map_err(to_stage_err)?;
        out.get_mut().extend_from_slice(&body.into_inner());
        write(&mut out, Event::End(BytesEnd::new("svg"))).map_err(to_stage_err)?;

        Ok(out.into_inner())
    }

    fn append_symbol(
        &self,
        body: &mut Writer<Vec<u8>>,
        id: &str,
        svg: &[u8],
        namespaces: &mut BTreeMap<Vec<u8>, Vec<u8>>,
    ) -> std::result::Result<(), String> {
        let mut reader = Reader::from_reader(svg);
        reader.config_mut().trim_text(false);
        let mut buf = Vec::new();
        // 0 = outside the root <svg>, 1 = directly inside it.
        let mut depth = 0usize;
        let mut found_root = false;

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| format!("invalid SVG at byte {}: {e}", reader.buffer_position()))?;

            match event {
                Event::Eof => break,
                Event::Start(e) => {
                    if depth == 0 {
                        if found_root {
                            return Err("more than one root element".to_string());
                        }
                        let symbol = self.symbol_start(&e, id, namespaces)?;
                        write(body, Event::Start(symbol))?;
                        found_root = true;
                    } else {
                        write(body, Event::Start(self.strip(&e)?))?;
                    }
                    depth += 1;
                }
                Event::Empty(e) => {
                    if depth == 0 {
                        if found_root {
                            return Err("more than one root element".to_string());
                        }
                        let symbol = self.symbol_start(&e, id, namespaces)?;
                        write(body, Event::Empty(symbol))?;
                        found_root = true;
                    } else {
                        write(body, Event::Empty(self.strip(&e)?))?;
                    }
                }
                Event::End(e) => {
                    match depth {
                        0 => return Err("unbalanced closing tag".to_string()),
                        1 => write(body, Event::End(BytesEnd::new("symbol")))?,
                        _ => write(body, Event::End(e))?,
                    }
                    depth -= 1;
                }
                Event::Text(t) => {
                    if depth > 0 && !t.iter().all(u8::is_ascii_whitespace) {
                        write(body, Event::Text(t))?;
                    }
                }
                Event::CData(c) => {
                    if depth > 0 {
                        write(body, Event::CData(c))?;
                    }
                }
                _ => {}
            }
            buf.clear();
        }

        if !found_root {
            return Err("no <svg> root element found".to_string());
        }
        Ok(())
    }

    fn symbol_start(
        &self,
        root: &BytesStart<'_>,
        id: &str,
        namespaces: &mut BTreeMap<Vec<u8>, Vec<u8>>,
    ) -> std::result::Result<BytesStart<'static>, String> {
        if root.local_name().as_ref() != b"svg" {
            return Err(format!(
                "root element is <{}>, expected <svg>",
                String::from_utf8_lossy(root.name().as_ref())
            ));
        }

        let mut symbol = BytesStart::new("symbol");
        symbol.push_attribute(("id", id));
        for attr in root.attributes() {
            let attr = attr.map_err(|e| format!("malformed attribute: {e}"))?;
            let key = attr.key.as_ref();
            if key.starts_with(b"xmlns:") && !is_editor_attr(key) {
                namespaces
                    .entry(key.to_vec())
                    .or_insert_with(|| attr.value.to_vec());
            } else if SYMBOL_ATTRS.contains(&key) {
                symbol.push_attribute(attr);
            }
        }
        Ok(symbol)
    }

    fn strip(&self, e: &BytesStart<'_>) -> std::result::Result<BytesStart<'static>, String> {
        filtered_start(e, |key| {
            !is_editor_attr(key) && !self.remove_attrs.is_match(&String::from_utf8_lossy(key))
        })
    }
}
