//! Minimal glTF 2.0 reader: node hierarchy, triangle meshes and base colours.
//!
//! Reads `.gltf` (external or `data:` buffers) and `.glb` containers. Textures,
//! skins, animations, morph targets and cameras are ignored.

use crate::constants::DEFAULT_BASE_COLOR;
use crate::error::LoadError;
use crate::scene::{MeshData, MeshId, NodeId, Primitive, SceneGraph, SceneNode};
use base64::Engine;
use fnv::FnvHashMap;
use glam::{Mat4, Quat, Vec3};
use serde::Deserialize;
use smallvec::SmallVec;
use std::collections::BTreeMap;

const MODE_TRIANGLES: u32 = 4;

const COMPONENT_U8: u32 = 5121;
const COMPONENT_U16: u32 = 5123;
const COMPONENT_U32: u32 = 5125;
const COMPONENT_F32: u32 = 5126;

const GLB_MAGIC: &[u8; 4] = b"glTF";
const GLB_CHUNK_JSON: u32 = 0x4E4F_534A;
const GLB_CHUNK_BIN: u32 = 0x004E_4942;

// Upper bound for accessors with no buffer view, which decode to zeros.
const MAX_ZERO_ACCESSOR_BYTES: usize = 64 << 20;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfDocument {
    #[serde(default)]
    pub asset: Asset,
    pub scene: Option<usize>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub meshes: Vec<Mesh>,
    #[serde(default)]
    pub accessors: Vec<Accessor>,
    #[serde(default)]
    pub buffer_views: Vec<BufferView>,
    #[serde(default)]
    pub buffers: Vec<Buffer>,
    #[serde(default)]
    pub materials: Vec<Material>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub version: String,
    pub generator: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Scene {
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Vec<usize>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Node {
    pub name: Option<String>,
    pub mesh: Option<usize>,
    #[serde(default)]
    pub children: Vec<usize>,
    pub matrix: Option<[f32; 16]>,
    pub translation: Option<[f32; 3]>,
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Mesh {
    pub name: Option<String>,
    #[serde(default)]
    pub primitives: Vec<MeshPrimitive>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MeshPrimitive {
    #[serde(default)]
    pub attributes: BTreeMap<String, usize>,
    pub indices: Option<usize>,
    pub material: Option<usize>,
    pub mode: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    pub buffer_view: Option<usize>,
    #[serde(default)]
    pub byte_offset: usize,
    pub component_type: u32,
    pub count: usize,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    pub buffer: usize,
    #[serde(default)]
    pub byte_offset: usize,
    pub byte_length: usize,
    pub byte_stride: Option<usize>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    pub uri: Option<String>,
    pub byte_length: usize,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub name: Option<String>,
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrMetallicRoughness {
    pub base_color_factor: Option<[f32; 4]>,
}

/// Where the bytes of one glTF buffer come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BufferSource {
    /// Relative URI to fetch next to the model file.
    External(String),
    /// Bytes decoded from a base64 `data:` URI.
    Embedded(Vec<u8>),
    /// The BIN chunk of the GLB container the document came from.
    BinaryChunk,
}

/// A parsed model file: the JSON document plus the GLB binary chunk, if any.
#[derive(Clone, Debug, Default)]
pub struct ModelFile {
    pub document: GltfDocument,
    pub binary_chunk: Option<Vec<u8>>,
}

impl ModelFile {
    /// Parse either a GLB container or plain glTF JSON, sniffing the magic.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        if bytes.starts_with(GLB_MAGIC) {
            return parse_glb(bytes);
        }
        Ok(Self {
            document: serde_json::from_slice(bytes)?,
            binary_chunk: None,
        })
    }

    /// Hand out the GLB binary chunk for buffer `index`. Only one buffer may claim it.
    pub fn take_binary_chunk(&mut self, index: usize) -> Result<Vec<u8>, LoadError> {
        self.binary_chunk
            .take()
            .ok_or(LoadError::MissingBinaryChunk { index })
    }
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let end = at.checked_add(4)?;
    let raw: [u8; 4] = bytes.get(at..end)?.try_into().ok()?;
    Some(u32::from_le_bytes(raw))
}

fn parse_glb(bytes: &[u8]) -> Result<ModelFile, LoadError> {
    let version = read_u32(bytes, 4).ok_or(LoadError::Glb("truncated header"))?;
    if version != 2 {
        return Err(LoadError::Glb("only GLB version 2 is supported"));
    }
    let declared = read_u32(bytes, 8).ok_or(LoadError::Glb("truncated header"))? as usize;
    let bytes = bytes
        .get(..declared)
        .ok_or(LoadError::Glb("file shorter than its header length"))?;

    let mut at = 12;
    let mut json: Option<&[u8]> = None;
    let mut bin: Option<&[u8]> = None;
    while at < bytes.len() {
        let len = read_u32(bytes, at).ok_or(LoadError::Glb("truncated chunk header"))? as usize;
        let kind = read_u32(bytes, at + 4).ok_or(LoadError::Glb("truncated chunk header"))?;
        let start = at + 8;
        let end = start
            .checked_add(len)
            .filter(|end| *end <= bytes.len())
            .ok_or(LoadError::Glb("chunk runs past the end of the file"))?;
        let data = &bytes[start..end];
        match kind {
            GLB_CHUNK_JSON if json.is_none() => json = Some(data),
            GLB_CHUNK_BIN if bin.is_none() => bin = Some(data),
            // unknown chunk types must be ignored
            _ => {}
        }
        at = end;
    }
    let json = json.ok_or(LoadError::Glb("missing JSON chunk"))?;
    Ok(ModelFile {
        document: serde_json::from_slice(json)?,
        binary_chunk: bin.map(<[u8]>::to_vec),
    })
}

fn decode_data_uri(index: usize, uri: &str) -> Result<Vec<u8>, LoadError> {
    let bad = |reason: &str| LoadError::DataUri {
        index,
        reason: reason.to_string(),
    };
    let (header, payload) = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| bad("missing ',' separator"))?;
    if !header.ends_with(";base64") {
        return Err(bad("only base64 payloads are supported"));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| bad(&e.to_string()))
}

impl GltfDocument {
    pub fn parse(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Source of every buffer, in buffer index order. `data:` URIs are decoded here.
    pub fn buffer_sources(&self) -> Result<Vec<BufferSource>, LoadError> {
        self.buffers
            .iter()
            .enumerate()
            .map(|(index, b)| match b.uri.as_deref() {
                None => Ok(BufferSource::BinaryChunk),
                Some(uri) if uri.starts_with("data:") => {
                    decode_data_uri(index, uri).map(BufferSource::Embedded)
                }
                Some(uri) => Ok(BufferSource::External(uri.to_string())),
            })
            .collect()
    }

    pub fn total_buffer_bytes(&self) -> usize {
        self.buffers
            .iter()
            .fold(0usize, |total, b| total.saturating_add(b.byte_length))
    }

    /// Build the scene graph from the document and its fetched buffers.
    ///
    /// Node ids match glTF node indices.
    pub fn build_scene(&self, buffers: &[Vec<u8>]) -> Result<SceneGraph, LoadError> {
        for (index, declared) in self.buffers.iter().enumerate() {
            let actual = buffers
                .get(index)
                .ok_or(LoadError::MissingReference { kind: "buffer", index })?
                .len();
            if actual < declared.byte_length {
                return Err(LoadError::ShortBuffer {
                    index,
                    expected: declared.byte_length,
                    actual,
                });
            }
        }

        let mut decoder = Decoder {
            doc: self,
            buffers,
            vec3_cache: FnvHashMap::default(),
        };
        let mut graph = SceneGraph::new();
        let mut mesh_ids: FnvHashMap<usize, MeshId> = FnvHashMap::default();

        for node in &self.nodes {
            let mesh = match node.mesh {
                Some(m) => Some(match mesh_ids.get(&m) {
                    Some(id) => *id,
                    None => {
                        let id = graph.add_mesh(decoder.mesh(m)?);
                        mesh_ids.insert(m, id);
                        id
                    }
                }),
                None => None,
            };
            let name = node
                .name
                .clone()
                .or_else(|| {
                    node.mesh
                        .and_then(|m| self.meshes.get(m))
                        .and_then(|m| m.name.clone())
                })
                .unwrap_or_default();
            graph.add_node(SceneNode::new(name, node_transform(node), mesh));
        }

        for (parent, node) in self.nodes.iter().enumerate() {
            for &child in &node.children {
                if child >= self.nodes.len() {
                    return Err(LoadError::MissingReference {
                        kind: "node",
                        index: child,
                    });
                }
                graph.add_child(NodeId(parent), NodeId(child));
            }
        }

        for root in self.root_nodes()? {
            graph.add_root(NodeId(root));
        }
        graph.update_world_transforms();
        Ok(graph)
    }

    fn root_nodes(&self) -> Result<Vec<usize>, LoadError> {
        let scene_index = self.scene.or(if self.scenes.is_empty() { None } else { Some(0) });
        let roots = match scene_index {
            Some(index) => self
                .scenes
                .get(index)
                .ok_or(LoadError::MissingReference { kind: "scene", index })?
                .nodes
                .clone(),
            None => {
                // no scenes declared: every node without a parent is a root
                let mut is_child = vec![false; self.nodes.len()];
                for n in &self.nodes {
                    for &c in &n.children {
                        if let Some(flag) = is_child.get_mut(c) {
                            *flag = true;
                        }
                    }
                }
                (0..self.nodes.len()).filter(|i| !is_child[*i]).collect()
            }
        };
        if let Some(&index) = roots.iter().find(|r| **r >= self.nodes.len()) {
            return Err(LoadError::MissingReference { kind: "node", index });
        }
        Ok(roots)
    }
}

fn node_transform(node: &Node) -> Mat4 {
    if let Some(m) = node.matrix {
        return Mat4::from_cols_array(&m);
    }
    let t = node.translation.map(Vec3::from_array).unwrap_or(Vec3::ZERO);
    let r = node
        .rotation
        .map(|q| Quat::from_array(q).normalize())
        .filter(|q| q.is_finite())
        .unwrap_or(Quat::IDENTITY);
    let s = node.scale.map(Vec3::from_array).unwrap_or(Vec3::ONE);
    Mat4::from_scale_rotation_translation(s, r, t)
}

struct Decoder<'a> {
    doc: &'a GltfDocument,
    buffers: &'a [Vec<u8>],
    vec3_cache: FnvHashMap<usize, Vec<Vec3>>,
}

impl<'a> Decoder<'a> {
    fn mesh(&mut self, index: usize) -> Result<MeshData, LoadError> {
        let doc = self.doc;
        let mesh = doc
            .meshes
            .get(index)
            .ok_or(LoadError::MissingReference { kind: "mesh", index })?;
        let mut primitives: SmallVec<[Primitive; 2]> = SmallVec::new();
        for (pi, prim) in mesh.primitives.iter().enumerate() {
            let mode = prim.mode.unwrap_or(MODE_TRIANGLES);
            if mode != MODE_TRIANGLES {
                log::warn!("[gltf] mesh {} primitive {}: mode {} skipped", index, pi, mode);
                continue;
            }
            let pos_accessor = *prim
                .attributes
                .get("POSITION")
                .ok_or(LoadError::MissingPositions {
                    mesh: index,
                    primitive: pi,
                })?;
            let positions = self.vec3(pos_accessor)?;
            let normals = match prim.attributes.get("NORMAL") {
                Some(&n) => Some(self.vec3(n)?),
                None => None,
            };
            let indices = match prim.indices {
                Some(i) => self.indices(i)?,
                None => (0..positions.len() as u32).collect(),
            };
            let color = prim
                .material
                .and_then(|m| doc.materials.get(m))
                .and_then(|m| m.pbr_metallic_roughness.as_ref())
                .and_then(|p| p.base_color_factor)
                .unwrap_or(DEFAULT_BASE_COLOR);
            match Primitive::new(positions, normals, indices, color) {
                Some(p) => primitives.push(p),
                None => log::debug!("[gltf] mesh {} primitive {}: empty", index, pi),
            }
        }
        Ok(MeshData {
            name: mesh.name.clone(),
            primitives,
        })
    }

    fn vec3(&mut self, index: usize) -> Result<Vec<Vec3>, LoadError> {
        if let Some(v) = self.vec3_cache.get(&index) {
            return Ok(v.clone());
        }
        let acc = self.accessor(index)?;
        if acc.component_type != COMPONENT_F32 || acc.kind != "VEC3" {
            return Err(LoadError::UnsupportedAccessor {
                index,
                what: format!("{} with component type {}", acc.kind, acc.component_type),
            });
        }
        let out: Vec<Vec3> = self
            .elements(index, 12)?
            .map(|b| Vec3::from_array(bytemuck::pod_read_unaligned::<[f32; 3]>(b)))
            .collect();
        self.vec3_cache.insert(index, out.clone());
        Ok(out)
    }

    fn indices(&self, index: usize) -> Result<Vec<u32>, LoadError> {
        let acc = self.accessor(index)?;
        if acc.kind != "SCALAR" {
            return Err(LoadError::UnsupportedAccessor {
                index,
                what: format!("index type {}", acc.kind),
            });
        }
        let out = match acc.component_type {
            COMPONENT_U8 => self.elements(index, 1)?.map(|b| b[0] as u32).collect(),
            COMPONENT_U16 => self
                .elements(index, 2)?
                .map(|b| bytemuck::pod_read_unaligned::<u16>(b) as u32)
                .collect(),
            COMPONENT_U32 => self
                .elements(index, 4)?
                .map(bytemuck::pod_read_unaligned::<u32>)
                .collect(),
            other => {
                return Err(LoadError::UnsupportedAccessor {
                    index,
                    what: format!("index component type {}", other),
                })
            }
        };
        Ok(out)
    }

    fn accessor(&self, index: usize) -> Result<&'a Accessor, LoadError> {
        self.doc
            .accessors
            .get(index)
            .ok_or(LoadError::MissingReference { kind: "accessor", index })
    }

    /// Byte slices of each element of an accessor, honouring offsets and stride.
    /// Accessors without a buffer view read as zeros.
    fn elements(
        &self,
        index: usize,
        elem_size: usize,
    ) -> Result<Box<dyn Iterator<Item = &'a [u8]> + 'a>, LoadError> {
        static ZEROS: [u8; 16] = [0; 16];
        let acc = self.accessor(index)?;
        let Some(view_index) = acc.buffer_view else {
            let fits = acc
                .count
                .checked_mul(elem_size)
                .is_some_and(|n| n <= MAX_ZERO_ACCESSOR_BYTES);
            if !fits {
                return Err(LoadError::UnsupportedAccessor {
                    index,
                    what: format!("zero-filled accessor of {} elements", acc.count),
                });
            }
            let zeros: &'a [u8] = &ZEROS[..elem_size];
            return Ok(Box::new(std::iter::repeat(zeros).take(acc.count)));
        };
        let view = self.doc.buffer_views.get(view_index).ok_or(LoadError::MissingReference {
            kind: "bufferView",
            index: view_index,
        })?;
        let buffer: &'a [u8] = self
            .buffers
            .get(view.buffer)
            .ok_or(LoadError::MissingReference {
                kind: "buffer",
                index: view.buffer,
            })?;
        let out_of_bounds = LoadError::AccessorOutOfBounds {
            index,
            view: view_index,
        };
        let Some(view_bytes) = view
            .byte_offset
            .checked_add(view.byte_length)
            .and_then(|end| buffer.get(view.byte_offset..end))
        else {
            return Err(out_of_bounds);
        };
        let stride = view.byte_stride.unwrap_or(elem_size).max(elem_size);
        let needed = match acc.count {
            0 => Some(0),
            n => (n - 1)
                .checked_mul(stride)
                .and_then(|span| span.checked_add(acc.byte_offset))
                .and_then(|span| span.checked_add(elem_size)),
        };
        if !needed.is_some_and(|needed| needed <= view_bytes.len()) {
            return Err(out_of_bounds);
        }
        let start = acc.byte_offset;
        Ok(Box::new((0..acc.count).map(move |i| {
            let o = start + i * stride;
            &view_bytes[o..o + elem_size]
        })))
    }
}
