//! Read-back validation of produced packages.
//!
//! The checker opens a package, parses `3D/3dmodel.model` with namespace
//! resolution and aggregates every finding into a [`ValidationReport`]
//! before deciding on a verdict. It never stops at the first defect.

use std::borrow::Cow;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use hashbrown::{HashMap, HashSet};
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use tracing::{info, warn};
use zip::ZipArchive;

use crate::error::{PackageError, PackageResult};
use crate::model::{MATERIAL_PREFIX, NAMESPACE_CORE, NAMESPACE_MATERIAL};
use crate::package::MODEL_PATH;

/// Findings of one validation run.
///
/// `Display` renders the line-oriented report followed by `OK` or `FAIL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Package path, when the report came from a file.
    pub source: Option<PathBuf>,
    /// Raw `requiredextensions` attribute of the model root.
    pub required_extensions: String,
    /// Prefix bound to the material namespace (`m` when undeclared).
    pub material_prefix: String,
    /// Whether `requiredextensions` lists [`Self::material_prefix`].
    pub has_material_extension: bool,
    /// Number of color groups.
    pub color_groups: usize,
    /// Color group ids, sorted.
    pub color_group_ids: Vec<String>,
    /// Number of colors over all groups.
    pub colors: usize,
    /// Number of objects.
    pub objects: usize,
    /// Number of objects holding a mesh.
    pub objects_with_mesh: usize,
    /// Component counts of objects built from components, as `(id, count)`.
    pub components: Vec<(String, usize)>,
    /// Number of build items.
    pub build_items: usize,
    /// Object ids referenced by build items, in document order.
    pub build_object_ids: Vec<String>,
    /// Build items referencing an object that is not declared.
    pub dangling_build_items: usize,
    /// Number of triangles over all meshes.
    pub triangles: usize,
    /// Triangles without a complete `pid/p1/p2/p3` set.
    pub triangles_missing: usize,
    /// Triangles whose `pid` names no color group.
    pub triangles_bad_pid: usize,
    /// Triangles whose property indices are not non-negative integers.
    pub triangles_bad_p: usize,
}

impl ValidationReport {
    /// Whether the package passes every check.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failures().is_empty()
    }

    /// One message per failed check.
    #[must_use]
    pub fn failures(&self) -> Vec<String> {
        let mut failures = Vec::new();
        if !self.has_material_extension {
            failures.push(format!(
                "requiredextensions does not include '{}'",
                self.material_prefix
            ));
        }
        if self.colors == 0 {
            failures.push("no colors declared".to_string());
        }
        if self.objects_with_mesh == 0 {
            failures.push("no mesh objects".to_string());
        }
        if self.build_items == 0 {
            failures.push("no build items".to_string());
        }
        if self.dangling_build_items > 0 {
            failures.push(format!(
                "{} build item(s) reference undeclared objects",
                self.dangling_build_items
            ));
        }
        if self.triangles == 0 {
            failures.push("no triangles".to_string());
        }
        if self.triangles_missing > 0 {
            failures.push(format!(
                "{} triangle(s) missing pid/p1/p2/p3",
                self.triangles_missing
            ));
        }
        if self.triangles_bad_pid > 0 {
            failures.push(format!(
                "{} triangle(s) with pid not in colorgroup ids",
                self.triangles_bad_pid
            ));
        }
        if self.triangles_bad_p > 0 {
            failures.push(format!(
                "{} triangle(s) with invalid p1/p2/p3",
                self.triangles_bad_p
            ));
        }
        failures
    }

    /// The package path, or `<memory>` for in-memory documents.
    #[must_use]
    pub fn source_label(&self) -> String {
        self.source
            .as_ref()
            .map_or_else(|| "<memory>".to_string(), |p| p.display().to_string())
    }

    /// Component count of an assembly object.
    #[must_use]
    pub fn components_of(&self, object_id: &str) -> Option<usize> {
        self.components
            .iter()
            .find(|(id, _)| id == object_id)
            .map(|&(_, count)| count)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "file: {}", self.source_label())?;
        writeln!(
            f,
            "requiredextensions includes '{}': {} ('{}')",
            self.material_prefix, self.has_material_extension, self.required_extensions
        )?;
        writeln!(
            f,
            "colorgroups: {} (ids=[{}]) colors_total={}",
            self.color_groups,
            self.color_group_ids.join(", "),
            self.colors
        )?;
        writeln!(
            f,
            "objects: {} with_mesh={}",
            self.objects, self.objects_with_mesh
        )?;
        writeln!(f, "build items: {}", self.build_items)?;
        writeln!(
            f,
            "build items referencing undeclared objects: {}",
            self.dangling_build_items
        )?;
        writeln!(f, "triangles: {}", self.triangles)?;
        writeln!(
            f,
            "triangles missing pid/p1/p2/p3: {}",
            self.triangles_missing
        )?;
        writeln!(
            f,
            "triangles with pid not in colorgroup ids: {}",
            self.triangles_bad_pid
        )?;
        writeln!(
            f,
            "triangles with invalid p1/p2/p3: {}",
            self.triangles_bad_p
        )?;
        f.write_str(if self.is_ok() { "OK" } else { "FAIL" })
    }
}

/// Validate a package file.
///
/// # Errors
///
/// Returns [`PackageError::MissingInput`] if the file does not exist,
/// [`PackageError::InvalidPackage`] if it is not a ZIP archive or has no
/// model document, and [`PackageError::Xml`] if the model is not well-formed.
/// Failed checks are not errors; inspect [`ValidationReport::is_ok`].
pub fn validate_package<P: AsRef<Path>>(path: P) -> PackageResult<ValidationReport> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PackageError::MissingInput {
            paths: vec![path.to_path_buf()],
        });
    }

    let file = std::fs::File::open(path).map_err(|e| PackageError::io(path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| PackageError::InvalidPackage {
        path: path.to_path_buf(),
        message: format!("not a ZIP archive: {e}"),
    })?;

    let mut model = archive
        .by_name(MODEL_PATH)
        .map_err(|_| PackageError::InvalidPackage {
            path: path.to_path_buf(),
            message: format!("missing {MODEL_PATH}"),
        })?;
    let mut xml = String::new();
    model
        .read_to_string(&mut xml)
        .map_err(|e| PackageError::InvalidPackage {
            path: path.to_path_buf(),
            message: format!("unreadable {MODEL_PATH}: {e}"),
        })?;

    let mut report = validate_model_xml(&xml)?;
    report.source = Some(path.to_path_buf());

    if report.is_ok() {
        info!(
            path = %path.display(),
            triangles = report.triangles,
            objects = report.objects,
            build_items = report.build_items,
            "Package passed validation"
        );
    } else {
        for failure in report.failures() {
            warn!(path = %path.display(), "{failure}");
        }
    }
    Ok(report)
}

/// Validate a model document held in memory.
///
/// # Errors
///
/// Returns [`PackageError::Xml`] if the document is not well-formed.
pub fn validate_model_xml(xml: &str) -> PackageResult<ValidationReport> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut checker = Checker::default();
    loop {
        let (space, event) = reader
            .read_resolved_event()
            .map_err(|e| PackageError::xml(format!("model parse error: {e}")))?;
        let space = Space::of(&space);
        match event {
            Event::Start(ref e) => {
                let node = checker.open(space, e);
                checker.stack.push(node);
            }
            Event::Empty(ref e) => {
                let node = checker.open(space, e);
                checker.close(node);
            }
            Event::End(_) => {
                if let Some(node) = checker.stack.pop() {
                    checker.close(node);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(checker.finish())
}

/// Namespace of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Space {
    Core,
    Material,
    Other,
}

impl Space {
    fn of(result: &ResolveResult<'_>) -> Self {
        match result {
            ResolveResult::Bound(Namespace(ns)) if *ns == NAMESPACE_CORE.as_bytes() => Self::Core,
            ResolveResult::Bound(Namespace(ns)) if *ns == NAMESPACE_MATERIAL.as_bytes() => {
                Self::Material
            }
            _ => Self::Other,
        }
    }
}

/// Elements the checker cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Model,
    Resources,
    ColorGroup,
    Object,
    Mesh,
    Triangles,
    Components,
    Build,
    Other,
}

#[derive(Debug, Default)]
struct ObjectScope {
    id: Option<String>,
    pid: Option<String>,
    pindex: Option<String>,
    components: Option<usize>,
}

#[derive(Debug, Default)]
struct Checker {
    stack: Vec<Node>,
    report: ValidationReport,
    material_prefix: Option<String>,
    color_group_ids: HashSet<String>,
    object_ids: HashSet<String>,
    pid_refs: HashMap<String, usize>,
    object: Option<ObjectScope>,
}

impl Checker {
    fn parent(&self) -> Option<Node> {
        self.stack.last().copied()
    }

    fn open(&mut self, space: Space, element: &BytesStart<'_>) -> Node {
        let local = element.local_name();
        match (space, local.as_ref(), self.parent()) {
            (Space::Core, b"model", None) => {
                self.open_model(element);
                Node::Model
            }
            (Space::Core, b"resources", Some(Node::Model)) => Node::Resources,
            (Space::Core, b"build", Some(Node::Model)) => Node::Build,
            (Space::Material, b"colorgroup", Some(Node::Resources)) => {
                self.report.color_groups += 1;
                if let Some(id) = attribute(element, "id") {
                    self.color_group_ids.insert(id);
                }
                Node::ColorGroup
            }
            (Space::Material, b"color", Some(Node::ColorGroup)) => {
                self.report.colors += 1;
                Node::Other
            }
            (Space::Core, b"object", Some(Node::Resources)) => {
                self.report.objects += 1;
                self.object = Some(ObjectScope {
                    id: attribute(element, "id"),
                    pid: attribute(element, "pid"),
                    pindex: attribute(element, "pindex"),
                    components: None,
                });
                Node::Object
            }
            (Space::Core, b"mesh", Some(Node::Object)) => {
                self.report.objects_with_mesh += 1;
                Node::Mesh
            }
            (Space::Core, b"triangles", Some(Node::Mesh)) => Node::Triangles,
            (Space::Core, b"triangle", Some(Node::Triangles)) => {
                self.check_triangle(element);
                Node::Other
            }
            (Space::Core, b"components", Some(Node::Object)) => {
                if let Some(object) = self.object.as_mut() {
                    object.components.get_or_insert(0);
                }
                Node::Components
            }
            (Space::Core, b"component", Some(Node::Components)) => {
                if let Some(count) = self.object.as_mut().and_then(|o| o.components.as_mut()) {
                    *count += 1;
                }
                Node::Other
            }
            (Space::Core, b"item", Some(Node::Build)) => {
                self.report.build_items += 1;
                self.report
                    .build_object_ids
                    .push(attribute(element, "objectid").unwrap_or_default());
                Node::Other
            }
            _ => Node::Other,
        }
    }

    fn close(&mut self, node: Node) {
        if node != Node::Object {
            return;
        }
        if let Some(object) = self.object.take() {
            let id = object.id.unwrap_or_default();
            if let Some(count) = object.components {
                self.report.components.push((id.clone(), count));
            }
            self.object_ids.insert(id);
        }
    }

    fn open_model(&mut self, element: &BytesStart<'_>) {
        for attr in element.attributes().flatten() {
            let key = attr.key.as_ref();
            if let Some(prefix) = key.strip_prefix(b"xmlns:") {
                if attr.value.as_ref() == NAMESPACE_MATERIAL.as_bytes() {
                    self.material_prefix = Some(String::from_utf8_lossy(prefix).into_owned());
                }
            } else if key == b"requiredextensions" {
                self.report.required_extensions = attr
                    .unescape_value()
                    .map(Cow::into_owned)
                    .unwrap_or_default();
            }
        }
    }

    fn check_triangle(&mut self, element: &BytesStart<'_>) {
        self.report.triangles += 1;

        let own = [
            attribute(element, "pid"),
            attribute(element, "p1"),
            attribute(element, "p2"),
            attribute(element, "p3"),
        ];
        let [pid, p1, p2, p3] = if own.iter().all(Option::is_none) {
            // A bare triangle takes the object's default property.
            match self.object.as_ref() {
                Some(ObjectScope {
                    pid: Some(pid),
                    pindex: Some(pindex),
                    ..
                }) => [
                    pid.clone(),
                    pindex.clone(),
                    pindex.clone(),
                    pindex.clone(),
                ],
                _ => {
                    self.report.triangles_missing += 1;
                    return;
                }
            }
        } else if let [Some(pid), Some(p1), Some(p2), Some(p3)] = own {
            [pid, p1, p2, p3]
        } else {
            self.report.triangles_missing += 1;
            return;
        };

        *self.pid_refs.entry(pid).or_insert(0) += 1;
        let valid_index = |p: &str| p.trim().parse::<i64>().is_ok_and(|i| i >= 0);
        if ![p1, p2, p3].iter().all(|p| valid_index(p.as_str())) {
            self.report.triangles_bad_p += 1;
        }
    }

    fn finish(mut self) -> ValidationReport {
        let prefix = self
            .material_prefix
            .unwrap_or_else(|| MATERIAL_PREFIX.to_string());
        self.report.has_material_extension = self
            .report
            .required_extensions
            .split_whitespace()
            .any(|token| token == prefix);
        self.report.material_prefix = prefix;

        // Groups may follow the objects that use them.
        self.report.triangles_bad_pid = self
            .pid_refs
            .iter()
            .filter(|(pid, _)| !self.color_group_ids.contains(pid.as_str()))
            .map(|(_, count)| count)
            .sum();

        self.report.dangling_build_items = self
            .report
            .build_object_ids
            .iter()
            .filter(|id| !self.object_ids.contains(id.as_str()))
            .count();

        let mut ids: Vec<String> = self.color_group_ids.into_iter().collect();
        ids.sort();
        self.report.color_group_ids = ids;
        self.report
    }
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == name.as_bytes())
        .and_then(|attr| attr.unescape_value().ok().map(Cow::into_owned))
}
