fn main() {
    if let Err(err) = wgpu_nbody::app::run() {
        log::error!("Event loop failed: {err}");
        std::process::exit(1);
    }
}
