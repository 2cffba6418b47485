use tracing_subscriber::EnvFilter;
use winit::event_loop::{ControlFlow, EventLoop};

use virtual_pad::app::App;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::from_env();

    event_loop
        .run_app(&mut app)
        .expect("Failed to run event loop");
}
