use log::warn;
use wgpu::util::DeviceExt;

use crate::rendering::camera::CameraUniform;
use crate::rendering::render_config::{QUAD_INDICES, QUAD_VERTICES, RenderConfig};
use crate::rendering::render_pass::{BACKGROUND, create_background_render_pass, run_compute_pass};
use crate::simulation::buffer_ring::{InitTargets, Slot, UpdateBindings};
use crate::simulation::commands::{FramePlan, GpuCommand};
use crate::simulation::dispatch::WorkSize;
use crate::simulation::params::ParameterSet;
use crate::simulation::types::{
    INDIRECT_BUFFER_SIZE, INDIRECT_DISPATCH_OFFSET, INDIRECT_DRAW_OFFSET, MAX_PARTICLE_COUNT,
    ParticlePosition, QUAD_INDEX_COUNT,
};

const SLOTS: [Slot; 2] = [Slot::A, Slot::B];

// GPU-resident simulation state. Dropping it releases every buffer.
pub(crate) struct SimulationResources {
    previous_buffers: [wgpu::Buffer; 2],
    current_buffers: [wgpu::Buffer; 2],
    params_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    indirect_buffer: Option<wgpu::Buffer>,
    quad_vertex_buffer: wgpu::Buffer,
    quad_index_buffer: wgpu::Buffer,

    // Indexed by [previous slot][current slot]
    init_bind_groups: [[wgpu::BindGroup; 2]; 2],
    update_bind_groups: [[wgpu::BindGroup; 2]; 2],
    indirect_bind_group: Option<wgpu::BindGroup>,
    render_bind_group: wgpu::BindGroup,
}

fn position_buffers(device: &wgpu::Device, role: &str) -> [wgpu::Buffer; 2] {
    let size = std::mem::size_of::<ParticlePosition>() as u64 * MAX_PARTICLE_COUNT as u64;
    SLOTS.map(|slot| {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{role} Positions {slot:?}")),
            size,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::VERTEX
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    })
}

impl SimulationResources {
    pub(crate) fn new(
        device: &wgpu::Device,
        render_config: &RenderConfig,
        params: &ParameterSet,
        camera: &CameraUniform,
    ) -> Self {
        let previous_buffers = position_buffers(device, "Previous");
        let current_buffers = position_buffers(device, "Current");

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Params Buffer"),
            contents: bytemuck::cast_slice(&[params.to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[*camera]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let quad_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let quad_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Index Buffer"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let init_bind_groups = SLOTS.map(|previous| {
            SLOTS.map(|current| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("Init Bind Group {previous:?}{current:?}")),
                    layout: &render_config.init_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: previous_buffers[previous.index()].as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: current_buffers[current.index()].as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: params_buffer.as_entire_binding(),
                        },
                    ],
                })
            })
        });

        // Reads come from the given slots, writes go to their partners
        let update_bind_groups = SLOTS.map(|previous| {
            SLOTS.map(|current| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("Update Bind Group {previous:?}{current:?}")),
                    layout: &render_config.update_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: previous_buffers[previous.index()].as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: current_buffers[current.index()].as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: previous_buffers[previous.other().index()]
                                .as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: current_buffers[current.other().index()].as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 4,
                            resource: params_buffer.as_entire_binding(),
                        },
                    ],
                })
            })
        });

        let indirect_buffer = render_config.indirect_pipeline.as_ref().map(|_| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Indirect Args Buffer"),
                size: INDIRECT_BUFFER_SIZE,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::INDIRECT,
                mapped_at_creation: false,
            })
        });

        let indirect_bind_group = indirect_buffer.as_ref().map(|buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Indirect Args Bind Group"),
                layout: &render_config.indirect_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: params_buffer.as_entire_binding(),
                    },
                ],
            })
        });

        let render_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Bind Group"),
            layout: &render_config.render_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            previous_buffers,
            current_buffers,
            params_buffer,
            camera_buffer,
            indirect_buffer,
            quad_vertex_buffer,
            quad_index_buffer,
            init_bind_groups,
            update_bind_groups,
            indirect_bind_group,
            render_bind_group,
        }
    }

    fn init_bind_group(&self, targets: &InitTargets) -> &wgpu::BindGroup {
        &self.init_bind_groups[targets.previous.index()][targets.current.index()]
    }

    fn update_bind_group(&self, bindings: &UpdateBindings) -> &wgpu::BindGroup {
        debug_assert!(bindings.is_hazard_free());
        debug_assert_eq!(bindings.previous_write, bindings.previous_read.other());
        debug_assert_eq!(bindings.current_write, bindings.current_read.other());
        &self.update_bind_groups[bindings.previous_read.index()][bindings.current_read.index()]
    }

    pub(crate) fn position_storage_bytes(&self) -> u64 {
        self.previous_buffers
            .iter()
            .chain(&self.current_buffers)
            .map(wgpu::Buffer::size)
            .sum()
    }

    pub(crate) fn update_camera(&self, queue: &wgpu::Queue, camera: &CameraUniform) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[*camera]));
    }

    /// Encodes `plan` in order. Draw commands need `target`; without one they are skipped.
    pub(crate) fn encode(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        render_config: &RenderConfig,
        plan: &FramePlan,
        target: Option<&wgpu::TextureView>,
    ) {
        for command in &plan.commands {
            match command {
                GpuCommand::UploadParams(params) => {
                    queue.write_buffer(
                        &self.params_buffer,
                        0,
                        bytemuck::cast_slice(&[params.to_uniform()]),
                    );
                }
                GpuCommand::Initialize { targets, groups } => {
                    run_compute_pass(
                        encoder,
                        "Init Instances Pass",
                        &render_config.init_pipeline,
                        self.init_bind_group(targets),
                        |pass| pass.dispatch_workgroups(*groups, 1, 1),
                    );
                }
                GpuCommand::ComputeIndirectArgs => {
                    let (Some(pipeline), Some(bind_group)) = (
                        render_config.indirect_pipeline.as_ref(),
                        self.indirect_bind_group.as_ref(),
                    ) else {
                        warn!("Indirect args requested without indirect support");
                        continue;
                    };
                    run_compute_pass(encoder, "Indirect Args Pass", pipeline, bind_group, |pass| {
                        pass.dispatch_workgroups(1, 1, 1)
                    });
                }
                GpuCommand::Update { bindings, work } => {
                    let bind_group = self.update_bind_group(bindings);
                    match (work, self.indirect_buffer.as_ref()) {
                        (WorkSize::Direct { groups, .. }, _) => {
                            run_compute_pass(
                                encoder,
                                "Update Instances Pass",
                                &render_config.update_pipeline,
                                bind_group,
                                |pass| pass.dispatch_workgroups(*groups, 1, 1),
                            );
                        }
                        (WorkSize::Indirect, Some(indirect)) => {
                            run_compute_pass(
                                encoder,
                                "Update Instances Pass",
                                &render_config.update_pipeline,
                                bind_group,
                                |pass| {
                                    pass.dispatch_workgroups_indirect(
                                        indirect,
                                        INDIRECT_DISPATCH_OFFSET,
                                    )
                                },
                            );
                        }
                        (WorkSize::Indirect, None) => {
                            warn!("Indirect update requested without an indirect buffer");
                        }
                    }
                }
                GpuCommand::Draw { instances, work } => {
                    let Some(view) = target else {
                        continue;
                    };
                    self.encode_draw(encoder, render_config, view, *instances, work);
                }
            }
        }
    }

    fn encode_draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        render_config: &RenderConfig,
        view: &wgpu::TextureView,
        instances: Slot,
        work: &WorkSize,
    ) {
        let mut render_pass = create_background_render_pass(encoder, view, BACKGROUND);

        render_pass.set_pipeline(&render_config.render_pipeline);
        render_pass.set_bind_group(0, &self.render_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.quad_vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.current_buffers[instances.index()].slice(..));
        render_pass.set_index_buffer(self.quad_index_buffer.slice(..), wgpu::IndexFormat::Uint16);

        match (work, self.indirect_buffer.as_ref()) {
            (WorkSize::Direct { items, .. }, _) => {
                render_pass.draw_indexed(0..QUAD_INDEX_COUNT, 0, 0..*items);
            }
            (WorkSize::Indirect, Some(indirect)) => {
                render_pass.draw_indexed_indirect(indirect, INDIRECT_DRAW_OFFSET);
            }
            (WorkSize::Indirect, None) => {
                warn!("Indirect draw requested without an indirect buffer");
            }
        }
    }
}
