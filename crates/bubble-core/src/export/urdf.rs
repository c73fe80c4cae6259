//! Spherized URDF generation
//!
//! The source document is streamed through unchanged; the only edit is one
//! `<collision>` element per sphere, inserted at the end of its link.
//! Transmissions, simulator extensions, comments and formatting survive.

use std::collections::HashMap;
use std::path::Path;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::{SphereRecord, SphereSet, write_atomic};
use crate::error::{EditError, ExportError};

/// Name given to an unnamed sphere collision: `<link>_sphere_<n>`
pub fn sphere_collision_name(link: &str, index: usize) -> String {
    format!("{link}_sphere_{index}")
}

/// Insert one sphere collision per record into the URDF text `source`
///
/// Spheres are added after a link's existing children, in record order.
/// Everything else is copied event by event.
pub fn spherize_urdf(source: &str, spheres: &SphereSet) -> Result<String, ExportError> {
    let mut pending = collisions_by_link(spheres);

    let mut reader = Reader::from_str(source);
    let mut writer = Writer::new(Vec::with_capacity(source.len()));
    let mut depth = 0usize;
    let mut open_link: Option<String> = None;

    loop {
        let event = reader.read_event().map_err(|e| ExportError::Urdf(e.to_string()))?;
        match event {
            Event::Eof => break,
            Event::Start(start) => {
                depth += 1;
                if depth == 2 && start.name().as_ref() == b"link" {
                    open_link = link_name(&start)?;
                }
                write(&mut writer, Event::Start(start))?;
            }
            Event::End(end) => {
                if depth == 2 && end.name().as_ref() == b"link" {
                    let collisions = open_link
                        .take()
                        .and_then(|name| pending.remove(&name))
                        .unwrap_or_default();
                    for collision in &collisions {
                        write(&mut writer, Event::Text(BytesText::new("  ")))?;
                        write_collision(&mut writer, collision)?;
                        write(&mut writer, Event::Text(BytesText::new("\n  ")))?;
                    }
                }
                depth = depth.saturating_sub(1);
                write(&mut writer, Event::End(end))?;
            }
            // `<link name="..."/>` is expanded only when it receives spheres
            Event::Empty(empty) if depth == 1 && empty.name().as_ref() == b"link" => {
                let collisions = link_name(&empty)?
                    .and_then(|name| pending.remove(&name))
                    .unwrap_or_default();
                if collisions.is_empty() {
                    write(&mut writer, Event::Empty(empty))?;
                } else {
                    write(&mut writer, Event::Start(empty))?;
                    for collision in &collisions {
                        write(&mut writer, Event::Text(BytesText::new("\n    ")))?;
                        write_collision(&mut writer, collision)?;
                    }
                    write(&mut writer, Event::Text(BytesText::new("\n  ")))?;
                    write(&mut writer, Event::End(BytesEnd::new("link")))?;
                }
            }
            other => write(&mut writer, other)?,
        }
    }

    // Records whose link never appeared in the document
    if let Some(record) = spheres
        .spheres
        .iter()
        .find(|record| pending.contains_key(&record.link))
    {
        return Err(EditError::UnknownLink(record.link.clone()).into());
    }

    String::from_utf8(writer.into_inner()).map_err(|e| ExportError::Urdf(e.to_string()))
}

/// Sphere collision ready to be written
struct SphereCollision {
    name: String,
    center: [f32; 3],
    radius: f32,
}

fn collisions_by_link(spheres: &SphereSet) -> HashMap<String, Vec<SphereCollision>> {
    let mut by_link: HashMap<String, Vec<SphereCollision>> = HashMap::new();
    for record in &spheres.spheres {
        let list = by_link.entry(record.link.clone()).or_default();
        let index = list.len();
        list.push(collision_for(record, index));
    }
    by_link
}

fn collision_for(record: &SphereRecord, index: usize) -> SphereCollision {
    SphereCollision {
        name: record
            .name
            .clone()
            .unwrap_or_else(|| sphere_collision_name(&record.link, index)),
        center: record.center,
        radius: record.radius,
    }
}

fn link_name(start: &BytesStart) -> Result<Option<String>, ExportError> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ExportError::Urdf(e.to_string()))?;
        if attr.key.as_ref() == b"name" {
            let value = attr
                .unescape_value()
                .map_err(|e| ExportError::Urdf(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), ExportError> {
    writer
        .write_event(event)
        .map_err(|e| ExportError::Urdf(e.to_string()))
}

/// `<collision name=".."><origin .../><geometry><sphere radius=".."/></geometry></collision>`
fn write_collision(
    writer: &mut Writer<Vec<u8>>,
    collision: &SphereCollision,
) -> Result<(), ExportError> {
    let [x, y, z] = collision.center;

    let mut start = BytesStart::new("collision");
    start.push_attribute(("name", collision.name.as_str()));
    write(writer, Event::Start(start))?;

    let mut origin = BytesStart::new("origin");
    origin.push_attribute(("xyz", format!("{x} {y} {z}").as_str()));
    origin.push_attribute(("rpy", "0 0 0"));
    write(writer, Event::Empty(origin))?;

    write(writer, Event::Start(BytesStart::new("geometry")))?;
    let mut sphere = BytesStart::new("sphere");
    sphere.push_attribute(("radius", collision.radius.to_string().as_str()));
    write(writer, Event::Empty(sphere))?;
    write(writer, Event::End(BytesEnd::new("geometry")))?;

    write(writer, Event::End(BytesEnd::new("collision")))
}

/// Write URDF text, replacing any existing file
pub(crate) fn save_urdf(xml: &str, path: &Path) -> Result<(), ExportError> {
    write_atomic(path, xml.as_bytes())?;
    tracing::info!("Exported URDF to {:?}", path);
    Ok(())
}
