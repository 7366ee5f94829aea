use glam::{Mat4, Vec3};
use std::rc::Rc;
use viewer_core::{Primitive, SceneGraph};
use wgpu::util::DeviceExt;

use super::helpers;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct ObjectUniforms {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
    color: [f32; 4],
}

impl ObjectUniforms {
    pub(crate) fn new(model: Mat4, color: [f32; 4]) -> Self {
        let normal = if model.determinant().abs() > 1e-12 {
            model.inverse().transpose()
        } else {
            model
        };
        Self {
            model: model.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
            color,
        }
    }
}

pub(crate) struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    pub(crate) fn upload(
        device: &wgpu::Device,
        label: &str,
        positions: &[Vec3],
        normals: &[Vec3],
        indices: &[u32],
    ) -> Self {
        let vertices: Vec<Vertex> = positions
            .iter()
            .zip(normals)
            .map(|(p, n)| Vertex {
                position: p.to_array(),
                normal: n.to_array(),
            })
            .collect();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    fn from_primitive(device: &wgpu::Device, label: &str, prim: &Primitive) -> Self {
        Self::upload(device, label, &prim.positions, &prim.normals, &prim.indices)
    }
}

/// One mesh draw with its own object uniforms.
pub(crate) struct DrawItem {
    mesh: Rc<GpuMesh>,
    /// Node transform relative to the model root.
    local: Mat4,
    color: [f32; 4],
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl DrawItem {
    pub(crate) fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        mesh: Rc<GpuMesh>,
        local: Mat4,
        color: [f32; 4],
    ) -> Self {
        let (uniforms, bind_group) = helpers::uniform_binding(
            device,
            layout,
            "object_uniforms",
            std::mem::size_of::<ObjectUniforms>() as u64,
        );
        Self {
            mesh,
            local,
            color,
            uniforms,
            bind_group,
        }
    }

    pub(crate) fn write(&self, queue: &wgpu::Queue, root: Mat4) {
        let u = ObjectUniforms::new(root * self.local, self.color);
        queue.write_buffer(&self.uniforms, 0, bytemuck::bytes_of(&u));
    }

    pub(crate) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_bind_group(1, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
        rpass.set_index_buffer(self.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.mesh.index_count, 0, 0..1);
    }
}

/// Upload every mesh primitive once and create a draw per mesh node.
pub(crate) fn build_model_draws(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    scene: &SceneGraph,
) -> Vec<DrawItem> {
    let uploaded: Vec<Vec<Rc<GpuMesh>>> = scene
        .meshes()
        .iter()
        .enumerate()
        .map(|(mi, mesh)| {
            mesh.primitives
                .iter()
                .map(|p| Rc::new(GpuMesh::from_primitive(device, &format!("mesh{}", mi), p)))
                .collect()
        })
        .collect();

    let mut draws = Vec::new();
    for (_, node, mesh) in scene.mesh_nodes() {
        let Some(gpu_prims) = node.mesh.and_then(|id| uploaded.get(id.0)) else {
            continue;
        };
        for (gpu, prim) in gpu_prims.iter().zip(&mesh.primitives) {
            draws.push(DrawItem::new(
                device,
                layout,
                gpu.clone(),
                node.world,
                prim.base_color,
            ));
        }
    }
    draws
}

/// Flat square in the XZ plane, facing +Y, centred on the origin.
pub(crate) fn ground_plane(device: &wgpu::Device, size: f32) -> GpuMesh {
    let h = size * 0.5;
    let positions = [
        Vec3::new(-h, 0.0, -h),
        Vec3::new(h, 0.0, -h),
        Vec3::new(h, 0.0, h),
        Vec3::new(-h, 0.0, h),
    ];
    let normals = [Vec3::Y; 4];
    GpuMesh::upload(device, "ground", &positions, &normals, &[0, 2, 1, 0, 3, 2])
}
