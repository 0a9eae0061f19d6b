//! Streaming rewrite of one slide part.
//!
//! Events are copied through unchanged except at the root's direct
//! children: an existing transition is dropped, and the new one is emitted
//! before the first `timing` or `extLst` child, or just before the root
//! closes. That keeps the schema's child order (`cSld`, `clrMapOvr`,
//! `transition`, `timing`, `extLst`) without parsing the rest of the slide.

use super::{PartSkipReason, TransitionSpec};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use std::fmt::Display;

/// PresentationML main namespace.
pub const PRESENTATION_NS: &[u8] = b"http://schemas.openxmlformats.org/presentationml/2006/main";

fn malformed(e: impl Display) -> PartSkipReason {
    PartSkipReason::Malformed(e.to_string())
}

fn qualified(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(p) => format!("{p}:{local}"),
        None => local.to_string(),
    }
}

fn write_transition(
    writer: &mut Writer<Vec<u8>>,
    prefix: Option<&str>,
    spec: &TransitionSpec,
) -> Result<(), PartSkipReason> {
    let name = qualified(prefix, "transition");
    let advance = spec.advance_after_ms().to_string();

    let mut start = BytesStart::new(name.as_str());
    start.push_attribute(("spd", spec.speed.as_str()));
    start.push_attribute(("advClick", "1"));
    start.push_attribute(("advTm", advance.as_str()));

    let effect = qualified(prefix, spec.kind.element());
    writer.write_event(Event::Start(start)).map_err(malformed)?;
    writer
        .write_event(Event::Empty(BytesStart::new(effect.as_str())))
        .map_err(malformed)?;
    writer
        .write_event(Event::End(BytesEnd::new(name.as_str())))
        .map_err(malformed)?;
    Ok(())
}

/// Insert (or replace) the slide's transition.
///
/// Fails with [`PartSkipReason::MissingSlideElement`] when the root is not a
/// PresentationML `sld`, and with [`PartSkipReason::Malformed`] when the
/// part does not parse.
pub fn inject_transition(xml: &[u8], spec: &TransitionSpec) -> Result<Vec<u8>, PartSkipReason> {
    let mut reader = NsReader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + 128));
    let mut buf = Vec::new();

    let mut depth = 0usize;
    let mut root_seen = false;
    let mut prefix: Option<String> = None;
    let mut inserted = false;
    // depth at which a dropped transition subtree started
    let mut skipping: Option<usize> = None;

    loop {
        buf.clear();
        let (ns, event) = reader.read_resolved_event_into(&mut buf).map_err(malformed)?;
        let in_pml = matches!(ns, ResolveResult::Bound(Namespace(n)) if n == PRESENTATION_NS);

        match event {
            Event::Eof => break,

            Event::Start(e) => {
                if skipping.is_some() {
                    depth += 1;
                    continue;
                }
                if !root_seen {
                    if !(in_pml && e.local_name().as_ref() == b"sld") {
                        return Err(PartSkipReason::MissingSlideElement);
                    }
                    root_seen = true;
                    prefix = root_prefix(&e);
                } else if depth == 1 && in_pml {
                    match e.local_name().as_ref() {
                        b"transition" => {
                            if !inserted {
                                write_transition(&mut writer, prefix.as_deref(), spec)?;
                                inserted = true;
                            }
                            skipping = Some(depth);
                            depth += 1;
                            continue;
                        }
                        b"timing" | b"extLst" if !inserted => {
                            write_transition(&mut writer, prefix.as_deref(), spec)?;
                            inserted = true;
                        }
                        _ => {}
                    }
                }
                writer.write_event(Event::Start(e)).map_err(malformed)?;
                depth += 1;
            }

            Event::Empty(e) => {
                if skipping.is_some() {
                    continue;
                }
                if !root_seen {
                    if !(in_pml && e.local_name().as_ref() == b"sld") {
                        return Err(PartSkipReason::MissingSlideElement);
                    }
                    // <p:sld/>: expand so the transition has somewhere to go
                    root_seen = true;
                    prefix = root_prefix(&e);
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    writer.write_event(Event::Start(e)).map_err(malformed)?;
                    write_transition(&mut writer, prefix.as_deref(), spec)?;
                    writer
                        .write_event(Event::End(BytesEnd::new(name)))
                        .map_err(malformed)?;
                    inserted = true;
                    continue;
                }
                if depth == 1 && in_pml {
                    match e.local_name().as_ref() {
                        b"transition" => {
                            if !inserted {
                                write_transition(&mut writer, prefix.as_deref(), spec)?;
                                inserted = true;
                            }
                            continue;
                        }
                        b"timing" | b"extLst" if !inserted => {
                            write_transition(&mut writer, prefix.as_deref(), spec)?;
                            inserted = true;
                        }
                        _ => {}
                    }
                }
                writer.write_event(Event::Empty(e)).map_err(malformed)?;
            }

            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if let Some(start) = skipping {
                    if depth == start {
                        skipping = None;
                    }
                    continue;
                }
                if depth == 0 && !inserted {
                    write_transition(&mut writer, prefix.as_deref(), spec)?;
                    inserted = true;
                }
                writer.write_event(Event::End(e)).map_err(malformed)?;
            }

            other => {
                if skipping.is_none() {
                    writer.write_event(other).map_err(malformed)?;
                }
            }
        }
    }

    if !root_seen {
        return Err(PartSkipReason::MissingSlideElement);
    }
    if depth != 0 || !inserted {
        return Err(malformed("unexpected end of document"));
    }
    Ok(writer.into_inner())
}

fn root_prefix(e: &BytesStart<'_>) -> Option<String> {
    e.name()
        .prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned())
}
