//! Package assembly and atomic ZIP output.
//!
//! A [`Package`] is the complete in-memory body of one 3MF file. It is built
//! from part objects, a palette and [`PackageOptions`], then written as a
//! deflate-compressed ZIP through a temporary file in the destination
//! directory that is persisted over the destination. The written file keeps
//! the permissions of the file it replaces, or gets the mode a plain file
//! create would give it.

use std::fs::{self, Permissions};
use std::io::{self, Write};
use std::path::Path;

use hashbrown::HashSet;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{PackageError, PackageResult};
use crate::model::{ModelDocument, generate_model_xml};
use crate::options::{BuildLayout, PackageOptions};
use crate::palette::Palette;
use crate::part::PartObject;
use crate::project::{MODEL_SETTINGS_PATH, Recognition, recognition};

/// Resource id of the single color group.
pub const COLOR_GROUP_ID: u32 = 1;

/// Archive path of the content types member.
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

/// Archive path of the package relationships member.
pub const RELS_PATH: &str = "_rels/.rels";

/// Archive path of the 3D model document.
pub const MODEL_PATH: &str = "3D/3dmodel.model";

/// Deflate level used for every member.
const COMPRESSION_LEVEL: i64 = 9;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
</Types>
"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Target="/3D/3dmodel.model" Id="rel0" Type="http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel"/>
</Relationships>
"#;

/// Resource identifiers resolved for one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectIds {
    /// Color group id.
    pub color_group: u32,
    /// Assembly object id, present only for the assembly layout.
    pub assembly: Option<u32>,
}

/// Resolve and check the resource ids of a package.
///
/// Part ids must be unique and must not take the color group id. The
/// assembly id is `max(part id) + 1` unless one is configured, and an
/// explicit id may not collide with any other resource.
///
/// # Errors
///
/// Returns [`PackageError::NoParts`] for an empty part list and
/// [`PackageError::DuplicateObjectId`] for any collision.
pub fn resolve_ids(parts: &[PartObject], options: &PackageOptions) -> PackageResult<ObjectIds> {
    let mut taken = HashSet::with_capacity(parts.len() + 1);
    taken.insert(COLOR_GROUP_ID);

    for part in parts {
        if !taken.insert(part.id()) {
            let context = if part.id() == COLOR_GROUP_ID {
                format!("part '{}' collides with the color group", part.name())
            } else {
                format!("part '{}' reuses an object id", part.name())
            };
            return Err(PackageError::DuplicateObjectId {
                id: part.id(),
                context,
            });
        }
    }

    let max_part_id = parts
        .iter()
        .map(PartObject::id)
        .max()
        .ok_or(PackageError::NoParts)?;

    let assembly = match options.build_layout {
        BuildLayout::Items => None,
        BuildLayout::Assembly => {
            let id = match options.assembly_object_id {
                Some(id) => id,
                None => max_part_id
                    .checked_add(1)
                    .ok_or_else(|| PackageError::DuplicateObjectId {
                        id: max_part_id,
                        context: "no id left for the assembly object".to_string(),
                    })?,
            };
            if taken.contains(&id) {
                return Err(PackageError::DuplicateObjectId {
                    id,
                    context: "assembly object id is already taken".to_string(),
                });
            }
            Some(id)
        }
    };

    Ok(ObjectIds {
        color_group: COLOR_GROUP_ID,
        assembly,
    })
}

/// The complete body of one 3MF package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    ids: ObjectIds,
    model: String,
    model_settings: Option<String>,
}

impl Package {
    /// Build a package from parts, a palette and options.
    ///
    /// # Errors
    ///
    /// Fails on an empty palette or part list, a part palette index out of
    /// range, an id collision, or an XML writer error.
    pub fn build(
        parts: &[PartObject],
        palette: &Palette,
        options: &PackageOptions,
    ) -> PackageResult<Self> {
        if palette.is_empty() {
            return Err(PackageError::EmptyPalette);
        }
        for part in parts {
            palette.check_index(part.name(), part.pindex())?;
        }
        let ids = resolve_ids(parts, options)?;

        let recognition: Option<Recognition> = if options.emit_project_metadata {
            Some(recognition(parts, ids.assembly)?)
        } else {
            None
        };

        let model = generate_model_xml(&ModelDocument {
            palette,
            parts,
            options,
            ids,
            recognition: recognition.as_ref(),
        })?;

        Ok(Self {
            ids,
            model,
            model_settings: recognition.map(|r| r.model_settings),
        })
    }

    /// Resolved resource ids.
    #[must_use]
    pub const fn ids(&self) -> ObjectIds {
        self.ids
    }

    /// The 3D model document.
    #[must_use]
    pub fn model_xml(&self) -> &str {
        &self.model
    }

    /// Archive members as `(path, contents)`, in archive order.
    #[must_use]
    pub fn members(&self) -> Vec<(&'static str, &str)> {
        let mut members = vec![
            (CONTENT_TYPES_PATH, CONTENT_TYPES_XML),
            (RELS_PATH, RELS_XML),
            (MODEL_PATH, self.model.as_str()),
        ];
        if let Some(settings) = &self.model_settings {
            members.push((MODEL_SETTINGS_PATH, settings.as_str()));
        }
        members
    }

    /// Contents of one archive member.
    #[must_use]
    pub fn member(&self, path: &str) -> Option<&str> {
        self.members()
            .into_iter()
            .find(|(name, _)| *name == path)
            .map(|(_, contents)| contents)
    }

    /// Write the package to `path`, replacing any existing file.
    ///
    /// The destination directory is created if needed. The archive is
    /// written to a temporary file beside the destination and renamed over
    /// it, so a failed write never leaves a partial package behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory, temporary file, archive or rename
    /// fails.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> PackageResult<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| PackageError::io(dir, e))?;

        let temp = temp_file_for(dir, path).map_err(|e| PackageError::io(dir, e))?;
        let mut zip = ZipWriter::new(temp.as_file());
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .compression_level(Some(COMPRESSION_LEVEL));

        for (name, contents) in self.members() {
            debug!(member = name, bytes = contents.len(), "Writing archive member");
            zip.start_file(name, options)
                .map_err(|e| PackageError::zip(e.to_string()))?;
            zip.write_all(contents.as_bytes())
                .map_err(|e| PackageError::io(temp.path(), e))?;
        }
        zip.finish().map_err(|e| PackageError::zip(e.to_string()))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| PackageError::io(temp.path(), e))?;

        temp.persist(path)
            .map_err(|e| PackageError::io(path, e.error))?;

        info!(
            path = %path.display(),
            members = self.members().len(),
            "Wrote package"
        );
        Ok(())
    }
}

/// Create the temporary file that will be persisted over `path`.
///
/// `NamedTempFile::new_in` creates `0600` files, which would leak into the
/// destination on rename.
fn temp_file_for(dir: &Path, path: &Path) -> io::Result<NamedTempFile> {
    let existing: Option<Permissions> = fs::metadata(path).ok().map(|m| m.permissions());

    #[cfg(unix)]
    let temp = {
        use std::os::unix::fs::PermissionsExt;
        // Same request as File::create; the umask applies
        tempfile::Builder::new()
            .permissions(Permissions::from_mode(0o666))
            .tempfile_in(dir)?
    };
    #[cfg(not(unix))]
    let temp = NamedTempFile::new_in(dir)?;

    if let Some(permissions) = existing {
        temp.as_file().set_permissions(permissions)?;
    }
    Ok(temp)
}

/// Build a package and write it to `path`.
///
/// # Errors
///
/// See [`Package::build`] and [`Package::write`].
pub fn write_package<P: AsRef<Path>>(
    parts: &[PartObject],
    palette: &Palette,
    options: &PackageOptions,
    path: P,
) -> PackageResult<Package> {
    let package = Package::build(parts, palette, options)?;
    package.write(path)?;
    Ok(package)
}
