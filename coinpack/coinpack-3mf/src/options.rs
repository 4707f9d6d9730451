//! Package layout options and the three output presets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PackageError;

/// Where the color reference is attached in the model document.
///
/// The two forms are alternative recognition paths in slicers; a package
/// uses exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorAttachment {
    /// `pid`/`pindex` on each `<object>` only.
    Object,
    /// `pid`/`p1`/`p2`/`p3` on every `<triangle>`.
    #[default]
    Triangle,
}

/// How build items reference the part objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildLayout {
    /// One build item per part object.
    #[default]
    Items,
    /// One build item referencing an assembly object whose components are
    /// the part objects.
    Assembly,
}

impl BuildLayout {
    /// Lower-case token used in configuration.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Items => "items",
            Self::Assembly => "assembly",
        }
    }
}

impl ColorAttachment {
    /// Lower-case token used in configuration.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Triangle => "triangle",
        }
    }
}

impl fmt::Display for BuildLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ColorAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildLayout {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "items" => Ok(Self::Items),
            "assembly" => Ok(Self::Assembly),
            _ => Err(PackageError::UnknownBuildLayout {
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for ColorAttachment {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "object" => Ok(Self::Object),
            "triangle" => Ok(Self::Triangle),
            _ => Err(PackageError::UnknownColorAttachment {
                value: s.to_string(),
            }),
        }
    }
}

/// Options controlling how a package is laid out.
///
/// # Example
///
/// ```
/// use coinpack_3mf::{BuildLayout, ColorAttachment, PackageOptions};
///
/// let options = PackageOptions::default()
///     .with_build_layout(BuildLayout::Assembly)
///     .with_assembly_object_id(100);
///
/// assert_eq!(options.color_attachment, ColorAttachment::Triangle);
/// assert_eq!(options.assembly_object_id, Some(100));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageOptions {
    /// Color attachment policy.
    pub color_attachment: ColorAttachment,
    /// Build item layout.
    pub build_layout: BuildLayout,
    /// Emit the slicer project-recognition metadata and per-part config.
    pub emit_project_metadata: bool,
    /// Explicit assembly object id. Computed as `max(part id) + 1` if unset.
    pub assembly_object_id: Option<u32>,
    /// Name of the assembly object.
    pub model_name: String,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            color_attachment: ColorAttachment::Triangle,
            build_layout: BuildLayout::Items,
            emit_project_metadata: false,
            assembly_object_id: None,
            model_name: "coin".to_string(),
        }
    }
}

impl PackageOptions {
    /// Generic colored package: triangle colors, one build item per part.
    #[must_use]
    pub fn colored() -> Self {
        Self::default()
    }

    /// Colored package built as one assembly of components.
    #[must_use]
    pub fn colored_assembly() -> Self {
        Self::default().with_build_layout(BuildLayout::Assembly)
    }

    /// Slicer-native project package: assembly layout plus recognition
    /// metadata and per-part extruder assignment.
    #[must_use]
    pub fn project() -> Self {
        Self::colored_assembly().with_project_metadata(true)
    }

    /// Set the color attachment policy.
    #[must_use]
    pub fn with_color_attachment(mut self, attachment: ColorAttachment) -> Self {
        self.color_attachment = attachment;
        self
    }

    /// Set the build layout.
    #[must_use]
    pub fn with_build_layout(mut self, layout: BuildLayout) -> Self {
        self.build_layout = layout;
        self
    }

    /// Enable or disable project-recognition metadata.
    #[must_use]
    pub fn with_project_metadata(mut self, enabled: bool) -> Self {
        self.emit_project_metadata = enabled;
        self
    }

    /// Use an explicit assembly object id.
    #[must_use]
    pub fn with_assembly_object_id(mut self, id: u32) -> Self {
        self.assembly_object_id = Some(id);
        self
    }

    /// Set the assembly object name.
    #[must_use]
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }
}
