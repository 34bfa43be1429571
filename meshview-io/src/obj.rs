//! OBJ format support
//!
//! Every `o` or `g` section of the file becomes one child node of the model
//! root, in file order. A section opened by `g` is named after the group; faces
//! in an `o` section before its first `g` take the object's name, and faces
//! before any section go into a node named `default`. A `usemtl` switch inside
//! a section does not start a new node. Polygons are fan triangulated; points
//! and lines are ignored.

use crate::{IoError, ModelReader};
use meshview_core::{Model, Point3f, Result, TriangleMesh};
use obj::{LoadConfig, ObjData, SimplePolygon};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Name the obj crate gives to faces outside any explicit section
const DEFAULT_SECTION: &str = "default";

pub struct ObjReader;

impl ModelReader for ObjReader {
    fn read_model<P: AsRef<Path>>(path: P) -> Result<Model> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => IoError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => IoError::Io(e),
        })?;
        Self::read_model_from_bytes(&crate::display_name(path), &data)
    }

    fn read_model_from_bytes(name: &str, data: &[u8]) -> Result<Model> {
        if data.is_empty() {
            return Err(IoError::EmptyInput {
                name: name.to_string(),
            }
            .into());
        }
        Ok(read_obj(name, data)?)
    }
}

/// Parse OBJ text from any reader into a model named `name`
pub fn read_obj<R: Read>(name: &str, reader: R) -> std::result::Result<Model, IoError> {
    // tolerate commands the parser does not know, such as `vp` or `cstype`
    let config = LoadConfig { strict: false };
    let data = ObjData::load_buf_with_config(reader, config).map_err(|e| IoError::ParseError {
        message: e.to_string(),
    })?;

    let positions: Vec<Point3f> = data
        .position
        .iter()
        .map(|&[x, y, z]| Point3f::new(x, y, z))
        .collect();

    let mut model = Model::new(name);
    let root = model.root();
    let mut first_face = 0;
    for section in sections(&data) {
        let mesh = section_mesh(&positions, &section.polys, first_face)?;
        first_face += section.polys.len();
        if mesh.is_empty() {
            continue;
        }
        debug!(section = %section.name, faces = mesh.face_count(), "read OBJ section");
        model
            .add_node(root, section.name, Some(mesh))
            .map_err(|e| IoError::ParseError { message: e.to_string() })?;
    }

    if !model.has_geometry() {
        return Err(IoError::NoGeometry {
            name: name.to_string(),
        });
    }
    Ok(model)
}

/// One `o`/`g` run of polygons, in file order
struct Section<'a> {
    name: String,
    polys: Vec<&'a SimplePolygon>,
}

/// Flatten objects and their groups into named sections
///
/// The obj crate splits a group in two when its material changes, bumping
/// the group index; those pieces are joined back into one section.
fn sections(data: &ObjData) -> Vec<Section<'_>> {
    let mut sections: Vec<Section<'_>> = Vec::new();
    for object in &data.objects {
        let mut previous: Option<&str> = None;
        for group in &object.groups {
            let name = if group.name == DEFAULT_SECTION {
                object.name.as_str()
            } else {
                group.name.as_str()
            };
            if group.index > 0 && previous == Some(group.name.as_str()) {
                if let Some(last) = sections.last_mut() {
                    last.polys.extend(&group.polys);
                }
            } else {
                sections.push(Section {
                    name: name.to_string(),
                    polys: group.polys.iter().collect(),
                });
            }
            previous = Some(group.name.as_str());
        }
    }
    sections
}

/// Build a self-contained mesh from a run of polygons
///
/// `first_face` is the file-wide number of the run's first polygon, used in
/// error reports.
fn section_mesh(
    positions: &[Point3f],
    polys: &[&SimplePolygon],
    first_face: usize,
) -> std::result::Result<TriangleMesh, IoError> {
    let mut mesh = TriangleMesh::new();
    let mut remap: HashMap<usize, usize> = HashMap::new();

    for (offset, SimplePolygon(corners)) in polys.iter().copied().enumerate() {
        if corners.len() < 3 {
            continue;
        }

        let mut local = Vec::with_capacity(corners.len());
        for corner in corners {
            let index = corner.0;
            let vertex = positions.get(index).ok_or(IoError::IndexOutOfRange {
                face: first_face + offset,
                index,
                count: positions.len(),
            })?;
            let next = mesh.vertices.len();
            let slot = *remap.entry(index).or_insert(next);
            if slot == next {
                mesh.add_vertex(*vertex);
            }
            local.push(slot);
        }

        for j in 1..local.len() - 1 {
            mesh.add_face([local[0], local[j], local[j + 1]]);
        }
    }

    mesh.compute_normals();
    Ok(mesh)
}
