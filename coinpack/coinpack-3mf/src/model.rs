//! 3D model document generation (`3D/3dmodel.model`).
//!
//! The document holds one color group with the whole palette, one mesh
//! object per part, an optional assembly object, and the build section.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{PackageError, PackageResult};
use crate::options::{BuildLayout, ColorAttachment, PackageOptions};
use crate::package::ObjectIds;
use crate::palette::Palette;
use crate::part::PartObject;
use crate::project::Recognition;

/// 3MF core namespace URI.
pub const NAMESPACE_CORE: &str = "http://schemas.microsoft.com/3dmanufacturing/core/2015/02";

/// 3MF material (color group) extension namespace URI.
pub const NAMESPACE_MATERIAL: &str =
    "http://schemas.microsoft.com/3dmanufacturing/material/2015/02";

/// Prefix bound to [`NAMESPACE_MATERIAL`] and listed in `requiredextensions`.
pub const MATERIAL_PREFIX: &str = "m";

/// Everything needed to write one model document.
pub(crate) struct ModelDocument<'a> {
    pub palette: &'a Palette,
    pub parts: &'a [PartObject],
    pub options: &'a PackageOptions,
    pub ids: ObjectIds,
    pub recognition: Option<&'a Recognition>,
}

/// Write one XML event, mapping the writer error.
pub(crate) fn emit<'e, W: Write>(
    writer: &mut Writer<W>,
    event: impl Into<Event<'e>>,
) -> PackageResult<()> {
    writer
        .write_event(event)
        .map_err(|e| PackageError::xml(format!("failed to write XML: {e}")))
}

/// Start a document with the standard XML declaration.
pub(crate) fn xml_writer() -> PackageResult<Writer<Vec<u8>>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    Ok(writer)
}

/// Finish a document and return it as a string.
pub(crate) fn finish(writer: Writer<Vec<u8>>) -> PackageResult<String> {
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes)
        .map_err(|e| PackageError::xml(format!("invalid UTF-8 in generated XML: {e}")))
}

/// Generate the model document.
pub(crate) fn generate_model_xml(doc: &ModelDocument<'_>) -> PackageResult<String> {
    let mut writer = xml_writer()?;

    let mut model = BytesStart::new("model");
    model.push_attribute(("xmlns", NAMESPACE_CORE));
    model.push_attribute(("xmlns:m", NAMESPACE_MATERIAL));
    if let Some(recognition) = doc.recognition {
        for (key, uri) in &recognition.namespaces {
            model.push_attribute((key.as_str(), uri.as_str()));
        }
    }
    model.push_attribute(("unit", "millimeter"));
    model.push_attribute(("xml:lang", "en-US"));
    model.push_attribute(("requiredextensions", MATERIAL_PREFIX));
    emit(&mut writer, Event::Start(model))?;

    if let Some(recognition) = doc.recognition {
        for (name, value) in &recognition.metadata {
            let mut metadata = BytesStart::new("metadata");
            metadata.push_attribute(("name", name.as_str()));
            emit(&mut writer, Event::Start(metadata))?;
            emit(&mut writer, Event::Text(BytesText::new(value)))?;
            emit(&mut writer, Event::End(BytesEnd::new("metadata")))?;
        }
    }

    emit(&mut writer, Event::Start(BytesStart::new("resources")))?;
    write_color_group(&mut writer, doc.palette, doc.ids.color_group)?;
    for part in doc.parts {
        write_part_object(
            &mut writer,
            part,
            doc.options.color_attachment,
            doc.ids.color_group,
        )?;
    }
    if let Some(assembly_id) = doc.ids.assembly {
        write_assembly_object(&mut writer, assembly_id, &doc.options.model_name, doc.parts)?;
    }
    emit(&mut writer, Event::End(BytesEnd::new("resources")))?;

    emit(&mut writer, Event::Start(BytesStart::new("build")))?;
    let item_ids: Vec<u32> = match (doc.options.build_layout, doc.ids.assembly) {
        (BuildLayout::Assembly, Some(id)) => vec![id],
        _ => doc.parts.iter().map(PartObject::id).collect(),
    };
    for id in item_ids {
        let mut item = BytesStart::new("item");
        item.push_attribute(("objectid", id.to_string().as_str()));
        emit(&mut writer, Event::Empty(item))?;
    }
    emit(&mut writer, Event::End(BytesEnd::new("build")))?;

    emit(&mut writer, Event::End(BytesEnd::new("model")))?;
    finish(writer)
}

fn write_color_group<W: Write>(
    writer: &mut Writer<W>,
    palette: &Palette,
    id: u32,
) -> PackageResult<()> {
    let mut group = BytesStart::new("m:colorgroup");
    group.push_attribute(("id", id.to_string().as_str()));
    emit(writer, Event::Start(group))?;

    for entry in palette.entries() {
        let mut color = BytesStart::new("m:color");
        color.push_attribute(("color", entry.color.to_string().as_str()));
        emit(writer, Event::Empty(color))?;
    }

    emit(writer, Event::End(BytesEnd::new("m:colorgroup")))
}

fn write_part_object<W: Write>(
    writer: &mut Writer<W>,
    part: &PartObject,
    attachment: ColorAttachment,
    color_group: u32,
) -> PackageResult<()> {
    let pid = color_group.to_string();
    let pindex = part.pindex().to_string();

    let mut object = BytesStart::new("object");
    object.push_attribute(("id", part.id().to_string().as_str()));
    object.push_attribute(("name", part.name()));
    object.push_attribute(("type", "model"));
    if attachment == ColorAttachment::Object {
        object.push_attribute(("pid", pid.as_str()));
        object.push_attribute(("pindex", pindex.as_str()));
    }
    emit(writer, Event::Start(object))?;
    emit(writer, Event::Start(BytesStart::new("mesh")))?;

    emit(writer, Event::Start(BytesStart::new("vertices")))?;
    for v in &part.mesh().vertices {
        let mut vertex = BytesStart::new("vertex");
        vertex.push_attribute(("x", format!("{:.6}", v.position.x).as_str()));
        vertex.push_attribute(("y", format!("{:.6}", v.position.y).as_str()));
        vertex.push_attribute(("z", format!("{:.6}", v.position.z).as_str()));
        emit(writer, Event::Empty(vertex))?;
    }
    emit(writer, Event::End(BytesEnd::new("vertices")))?;

    emit(writer, Event::Start(BytesStart::new("triangles")))?;
    for &[v1, v2, v3] in &part.mesh().faces {
        let mut triangle = BytesStart::new("triangle");
        triangle.push_attribute(("v1", v1.to_string().as_str()));
        triangle.push_attribute(("v2", v2.to_string().as_str()));
        triangle.push_attribute(("v3", v3.to_string().as_str()));
        if attachment == ColorAttachment::Triangle {
            triangle.push_attribute(("pid", pid.as_str()));
            triangle.push_attribute(("p1", pindex.as_str()));
            triangle.push_attribute(("p2", pindex.as_str()));
            triangle.push_attribute(("p3", pindex.as_str()));
        }
        emit(writer, Event::Empty(triangle))?;
    }
    emit(writer, Event::End(BytesEnd::new("triangles")))?;

    emit(writer, Event::End(BytesEnd::new("mesh")))?;
    emit(writer, Event::End(BytesEnd::new("object")))
}

fn write_assembly_object<W: Write>(
    writer: &mut Writer<W>,
    id: u32,
    name: &str,
    parts: &[PartObject],
) -> PackageResult<()> {
    let mut object = BytesStart::new("object");
    object.push_attribute(("id", id.to_string().as_str()));
    object.push_attribute(("name", name));
    object.push_attribute(("type", "model"));
    emit(writer, Event::Start(object))?;

    emit(writer, Event::Start(BytesStart::new("components")))?;
    for part in parts {
        let mut component = BytesStart::new("component");
        component.push_attribute(("objectid", part.id().to_string().as_str()));
        emit(writer, Event::Empty(component))?;
    }
    emit(writer, Event::End(BytesEnd::new("components")))?;

    emit(writer, Event::End(BytesEnd::new("object")))
}
