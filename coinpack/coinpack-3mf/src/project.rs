//! Slicer project recognition.
//!
//! Bambu Studio only treats a 3MF as a multi-part project when the model
//! carries its namespace and application metadata and the package holds a
//! `Metadata/model_settings.config` member assigning parts to extruders.
//! All of this is emitted together behind
//! [`PackageOptions::emit_project_metadata`](crate::PackageOptions).

use quick_xml::events::{BytesEnd, BytesStart, Event};

use crate::error::PackageResult;
use crate::model::{emit, finish, xml_writer};
use crate::part::PartObject;

/// Bambu Studio package namespace URI.
pub const NAMESPACE_BAMBU: &str = "http://schemas.bambulab.com/package/2021";

/// Application string recorded in the model metadata.
pub const APPLICATION: &str = "BambuStudio-02.00.02.01";

/// Project format version recorded in the model metadata.
pub const PROJECT_VERSION: &str = "1";

/// Archive path of the per-object settings member.
pub const MODEL_SETTINGS_PATH: &str = "Metadata/model_settings.config";

/// Additions made to a package so the slicer opens it as a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
    /// Extra namespace declarations on the model root, as `(attribute, uri)`.
    pub namespaces: Vec<(String, String)>,
    /// Model-level `<metadata name=..>value</metadata>` entries.
    pub metadata: Vec<(String, String)>,
    /// Contents of [`MODEL_SETTINGS_PATH`].
    pub model_settings: String,
}

/// Build the recognition additions for a set of parts.
///
/// With an assembly object, the settings group every part under it.
/// Otherwise each part is its own object holding exactly one part.
///
/// # Errors
///
/// Returns an error if the settings document cannot be written.
pub fn recognition(parts: &[PartObject], assembly_id: Option<u32>) -> PackageResult<Recognition> {
    Ok(Recognition {
        namespaces: vec![("xmlns:BambuStudio".to_string(), NAMESPACE_BAMBU.to_string())],
        metadata: vec![
            ("Application".to_string(), APPLICATION.to_string()),
            (
                "BambuStudio:3mfVersion".to_string(),
                PROJECT_VERSION.to_string(),
            ),
        ],
        model_settings: model_settings_xml(parts, assembly_id)?,
    })
}

fn model_settings_xml(parts: &[PartObject], assembly_id: Option<u32>) -> PackageResult<String> {
    let mut writer = xml_writer()?;
    emit(&mut writer, Event::Start(BytesStart::new("config")))?;

    let groups: Vec<(u32, &[PartObject])> = match assembly_id {
        Some(id) => vec![(id, parts)],
        None => parts
            .iter()
            .map(|part| (part.id(), std::slice::from_ref(part)))
            .collect(),
    };

    for (object_id, members) in groups {
        let mut object = BytesStart::new("object");
        object.push_attribute(("id", object_id.to_string().as_str()));
        emit(&mut writer, Event::Start(object))?;

        for part in members {
            let mut element = BytesStart::new("part");
            element.push_attribute(("id", part.id().to_string().as_str()));
            element.push_attribute(("subtype", "model_part"));
            emit(&mut writer, Event::Start(element))?;
            write_setting(&mut writer, "name", part.name())?;
            write_setting(&mut writer, "extruder", &part.extruder().to_string())?;
            emit(&mut writer, Event::End(BytesEnd::new("part")))?;
        }

        emit(&mut writer, Event::End(BytesEnd::new("object")))?;
    }

    emit(&mut writer, Event::End(BytesEnd::new("config")))?;
    finish(writer)
}

fn write_setting(
    writer: &mut quick_xml::Writer<Vec<u8>>,
    key: &str,
    value: &str,
) -> PackageResult<()> {
    let mut metadata = BytesStart::new("metadata");
    metadata.push_attribute(("key", key));
    metadata.push_attribute(("value", value));
    emit(writer, Event::Empty(metadata))
}
