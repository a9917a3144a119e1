mod framework;

use frustum_mesh::texture::RegionTexture;
use frustum_mesh::pipeline::{CAMERA_GROUP, DEPTH_FORMAT};
use frustum_mesh::{
    CameraUniform, CylinderMesh, MaterialShader, RegionTextures, SceneConfig, Shading,
    TransformRing,
};
use std::path::PathBuf;
use std::time::Instant;
use std::{f32::consts, future::Future, pin::Pin, task};
use tracing::{error, info};
use wgpu::util::DeviceExt;
use winit::event::{ElementState, KeyboardInput, VirtualKeyCode, WindowEvent};

/// A wrapper for `pop_error_scope` futures that logs an error if one occurs.
///
/// Given a future `inner` of an `Option<E>` for some error type `E`,
/// wait for the future to be ready, and report its value if it is `Some`.
struct ErrorFuture<F> {
    inner: F,
}
impl<F: Future<Output = Option<wgpu::Error>>> Future for ErrorFuture<F> {
    type Output = ();
    fn poll(self: Pin<&mut Self>, cx: &mut task::Context<'_>) -> task::Poll<()> {
        let inner = unsafe { self.map_unchecked_mut(|me| &mut me.inner) };
        inner.poll(cx).map(|err| {
            if let Some(e) = err {
                error!("rendering: {}", e);
            }
        })
    }
}

// Light orbits with the camera so the lit side stays in view
const EYE: glam::Vec3 = glam::Vec3::new(0.0, 2.5, 6.0);
const LIGHT: glam::Vec3 = glam::Vec3::new(3.0, 4.0, 5.0);

// Draws issued per frame: the mesh and an upside-down copy
const DRAWS_PER_FRAME: u32 = 2;

fn scene_from_args() -> anyhow::Result<SceneConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let path = PathBuf::from(path);
            info!(path = %path.display(), "loading scene");
            Ok(SceneConfig::load(&path)?)
        }
        None => Ok(SceneConfig::default()),
    }
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
    });
    depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
}

struct Viewer {
    shader: MaterialShader,
    mesh: CylinderMesh,
    // Region textures stay owned here, the mesh only binds them
    _textures: [RegionTexture; 3],
    shading: Shading,
    camera_buf: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    transforms: TransformRing,
    depth_view: wgpu::TextureView,
    start: Instant,
}

impl Viewer {
    fn generate_camera(aspect_ratio: f32) -> CameraUniform {
        let projection = glam::Mat4::perspective_rh(consts::FRAC_PI_4, aspect_ratio, 0.1, 50.0);
        let view = glam::Mat4::look_at_rh(EYE, glam::Vec3::ZERO, glam::Vec3::Y);
        CameraUniform::new(projection * view, EYE, LIGHT)
    }

    fn load_textures(
        scene: &SceneConfig,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> anyhow::Result<[RegionTexture; 3]> {
        match &scene.textures {
            Some(paths) => Ok([
                RegionTexture::from_path(device, queue, &paths.lateral)?,
                RegionTexture::from_path(device, queue, &paths.top_cap)?,
                RegionTexture::from_path(device, queue, &paths.base_cap)?,
            ]),
            None => Ok([
                RegionTexture::checkerboard(device, queue, [200, 120, 40, 255], [90, 50, 20, 255], "Lateral"),
                RegionTexture::checkerboard(device, queue, [40, 160, 200, 255], [20, 60, 90, 255], "Top Cap"),
                RegionTexture::checkerboard(device, queue, [60, 180, 60, 255], [20, 70, 20, 255], "Base Cap"),
            ]),
        }
    }
}

impl framework::Example for Viewer {
    fn init(
        config: &wgpu::SurfaceConfiguration,
        _adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> anyhow::Result<Self> {
        let scene = scene_from_args()?;
        info!(shape = ?scene.shape, shading = ?scene.shading, "scene ready");

        let shader = MaterialShader::new(device, config.format);
        let textures = Self::load_textures(&scene, device, queue)?;

        let mesh = CylinderMesh::new(
            device,
            &shader,
            scene.shape,
            scene.material,
            RegionTextures {
                lateral: &textures[0].view,
                top_cap: &textures[1].view,
                base_cap: &textures[2].view,
            },
        );

        let camera = Self::generate_camera(config.width as f32 / config.height as f32);
        let camera_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::bytes_of(&camera),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &shader.camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buf.as_entire_binding(),
            }],
            label: Some("Camera Bind Group"),
        });

        let transforms = TransformRing::new(device, &shader.transform_layout, DRAWS_PER_FRAME);

        Ok(Viewer {
            shader,
            mesh,
            _textures: textures,
            shading: scene.shading.into(),
            camera_buf,
            camera_bind_group,
            transforms,
            depth_view: create_depth_view(device, config),
            start: Instant::now(),
        })
    }

    fn update(&mut self, event: WindowEvent) {
        if let WindowEvent::KeyboardInput {
            input:
                KeyboardInput {
                    virtual_keycode: Some(VirtualKeyCode::T),
                    state: ElementState::Pressed,
                    ..
                },
            ..
        } = event
        {
            self.shading = match self.shading {
                Shading::Textured => Shading::Flat,
                Shading::Flat => Shading::Textured,
            };
            info!(shading = ?self.shading, "switched shading");
        }
    }

    fn resize(
        &mut self,
        config: &wgpu::SurfaceConfiguration,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) {
        let camera = Self::generate_camera(config.width as f32 / config.height as f32);
        queue.write_buffer(&self.camera_buf, 0, bytemuck::bytes_of(&camera));
        self.depth_view = create_depth_view(device, config);
    }

    fn render(
        &mut self,
        view: &wgpu::TextureView,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        spawner: &framework::Spawner,
    ) {
        let t = self.start.elapsed().as_secs_f32();
        let spin = glam::Mat4::from_rotation_y(t * 0.6) * glam::Mat4::from_rotation_x(0.35);
        let models = [
            glam::Mat4::from_translation(glam::Vec3::new(-1.2, 0.0, 0.0)) * spin,
            glam::Mat4::from_translation(glam::Vec3::new(1.2, 0.0, 0.0))
                * glam::Mat4::from_rotation_z(consts::PI)
                * spin,
        ];
        let mut transforms = self.transforms.frame();

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: None,
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.2,
                            b: 0.3,
                            a: 1.0,
                        }),
                        store: true,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: true,
                    }),
                    stencil_ops: None,
                }),
            });
            rpass.set_bind_group(CAMERA_GROUP, &self.camera_bind_group, &[]);
            for model in models {
                match self.shading {
                    Shading::Textured => self.mesh.draw_textured(
                        &mut rpass,
                        queue,
                        &self.shader,
                        &mut transforms,
                        model,
                    ),
                    Shading::Flat => {
                        self.mesh
                            .draw_flat(&mut rpass, queue, &self.shader, &mut transforms, model)
                    }
                }
            }
        }

        queue.submit(Some(encoder.finish()));

        spawner.spawn_local(ErrorFuture {
            inner: device.pop_error_scope(),
        });
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    framework::run::<Viewer>("Frustum mesh")
}
