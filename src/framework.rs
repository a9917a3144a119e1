use std::time::Instant;
use tracing::{info, warn};
use winit::event;
use winit::event::WindowEvent;
use winit::event_loop::{ControlFlow, EventLoop};

use frustum_mesh::Error;

pub trait Example: 'static + Sized {
    fn init(
        config: &wgpu::SurfaceConfiguration,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> anyhow::Result<Self>;
    fn resize(
        &mut self,
        config: &wgpu::SurfaceConfiguration,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    );
    fn update(&mut self, event: WindowEvent);
    fn render(
        &mut self,
        view: &wgpu::TextureView,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        spawner: &Spawner,
    );
}

struct Setup {
    window: winit::window::Window,
    event_loop: EventLoop<()>,
    instance: wgpu::Instance,
    size: winit::dpi::PhysicalSize<u32>,
    surface: wgpu::Surface,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

pub struct Spawner<'a> {
    executor: async_executor::LocalExecutor<'a>,
}

impl<'a> Spawner<'a> {
    fn new() -> Self {
        Self {
            executor: async_executor::LocalExecutor::new(),
        }
    }

    pub fn spawn_local(&self, future: impl std::future::Future<Output = ()> + 'a) {
        self.executor.spawn(future).detach();
    }

    fn run_until_stalled(&self) {
        while self.executor.try_tick() {}
    }
}

async fn setup(title: &str) -> anyhow::Result<Setup> {
    let event_loop = EventLoop::new();
    // Building the window
    let window = winit::window::WindowBuilder::new()
        .with_title(title)
        .build(&event_loop)?;

    // Describes which backends we want to use, WGPU_BACKEND can force one (vulkan, metal, dx12, gl)
    let backend = wgpu::util::backend_bits_from_env().unwrap_or_else(wgpu::Backends::all);
    let instance = wgpu::Instance::new(backend);

    // Physical size of the window's client area
    let size = window.inner_size();
    // Surface onto which rendered frames are presented
    let surface = unsafe { instance.create_surface(&window) };

    // Handle to the graphics device
    let adapter = wgpu::util::initialize_adapter_from_env_or_default(&instance, backend, Some(&surface))
        .await
        .ok_or(Error::NoAdapter)?;

    let adapter_info = adapter.get_info();
    info!(name = %adapter_info.name, backend = ?adapter_info.backend, "using adapter");

    // Device owns the GPU resources, queue takes the submitted work
    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: None,
                features: wgpu::Features::empty(),
                limits: adapter.limits(),
            },
            None,
        )
        .await
        .map_err(Error::from)?;

    Ok(Setup {
        window,
        event_loop,
        instance,
        size,
        surface,
        adapter,
        device,
        queue,
    })
}

fn start<E: Example>(
    Setup {
        window,
        event_loop,
        instance,
        size,
        surface,
        adapter,
        device,
        queue,
    }: Setup,
) -> anyhow::Result<()> {
    let spawner = Spawner::new();

    // Configuration of the surface
    let mut config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface.get_supported_formats(&adapter)[0],
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: wgpu::PresentMode::Fifo,
        alpha_mode: wgpu::CompositeAlphaMode::Auto,
    };
    surface.configure(&device, &config);

    let mut last_frame_inst = Instant::now();
    let (mut frame_count, mut accum_time) = (0.0, 0.0);

    let mut example = E::init(&config, &adapter, &device, &queue)?;

    event_loop.run(move |event, _, control_flow| {
        let _ = (&instance, &adapter); // force ownership by the closure
        *control_flow = ControlFlow::Poll;
        match event {
            event::Event::RedrawEventsCleared => {
                spawner.run_until_stalled();
                window.request_redraw();
            }
            event::Event::WindowEvent {
                event:
                    WindowEvent::Resized(size)
                    | WindowEvent::ScaleFactorChanged {
                        new_inner_size: &mut size,
                        ..
                    },
                ..
            } => {
                config.width = size.width.max(1);
                config.height = size.height.max(1);
                example.resize(&config, &device, &queue);
                surface.configure(&device, &config);
            }
            event::Event::WindowEvent { event, .. } => match event {
                WindowEvent::KeyboardInput {
                    input:
                        event::KeyboardInput {
                            virtual_keycode: Some(event::VirtualKeyCode::Escape),
                            state: event::ElementState::Pressed,
                            ..
                        },
                    ..
                }
                | WindowEvent::CloseRequested => {
                    *control_flow = ControlFlow::Exit;
                }
                _ => {
                    example.update(event);
                }
            },
            event::Event::RedrawRequested(_) => {
                {
                    accum_time += last_frame_inst.elapsed().as_secs_f32();
                    last_frame_inst = Instant::now();
                    frame_count += 1.0;
                    if frame_count == 100.0 {
                        info!(fps = frame_count / accum_time, "average frame rate");
                        accum_time = 0.0;
                        frame_count = 0.0;
                    }
                }

                let frame = match surface.get_current_texture() {
                    Ok(frame) => frame,
                    Err(err) => {
                        warn!(%err, "reconfiguring surface");
                        surface.configure(&device, &config);
                        match surface.get_current_texture() {
                            Ok(frame) => frame,
                            Err(err) => {
                                warn!(%err, "skipping frame");
                                return;
                            }
                        }
                    }
                };

                let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

                example.render(&view, &device, &queue, &spawner);
                frame.present();
            }
            _ => {}
        }
    })
}

pub fn run<E: Example>(title: &str) -> anyhow::Result<()> {
    let setup = pollster::block_on(setup(title))?;
    start::<E>(setup)
}
