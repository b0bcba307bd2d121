use std::path::PathBuf;

use argh::FromArgs;
use fovea::io::stream::{CaptureProperty, FileSource, Video, VideoWindow, WindowBackend};

#[derive(FromArgs, Debug)]
/// Inspect a video file and optionally play it back in a window.
struct Args {
    /// path to the input video file
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// show the frames in a window while reading
    #[argh(switch, short = 's')]
    show: bool,

    /// window backend to render with, one of auto, gl, x11, xv
    #[argh(option, short = 'b', default = "String::from(\"auto\")")]
    backend: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    let mut video = Video::new(&FileSource::new(&args.input))?;

    match video.frame_size() {
        Some(size) => log::info!("frame size: {}", size),
        None => log::info!("frame size: unknown"),
    }
    log::info!("fps: {}", video.fps());
    log::info!("wait time: {:.4}s", video.wait_time());
    match video.num_frames() {
        Ok(n) => log::info!("frames: {}", n),
        Err(_) => log::info!("frames: unknown"),
    }
    if let Some(brightness) = video.get(CaptureProperty::Brightness)? {
        log::info!("brightness: {}", brightness);
    }

    let mut window = if args.show {
        let mut window =
            VideoWindow::new("video-info").with_backend(args.backend.parse::<WindowBackend>()?);
        window.open()?;
        Some(window)
    } else {
        None
    };

    let mut count = 0usize;
    while let Some(frame) = video.read_frame()? {
        if let Some(window) = window.as_mut() {
            window.write(&frame)?;
            std::thread::sleep(std::time::Duration::from_secs_f64(video.wait_time()));
        }
        count += 1;
    }
    log::info!("read {} frames", count);

    if let Some(window) = window.as_mut() {
        window.close()?;
    }
    video.close()?;

    Ok(())
}
