use std::path::PathBuf;
use std::str::FromStr;

use argh::FromArgs;
use fovea::io::{read_image, write_image, ColorMode, ImageFormat, ReduceRatio};

#[derive(FromArgs, Debug)]
/// Convert an image between the supported codecs.
struct Args {
    /// path to the input image
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// path to the output image, the extension picks the codec
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// color mode to decode with, one of unchanged, grayscale, color
    #[argh(option, short = 'm', default = "String::from(\"color\")")]
    mode: String,

    /// downscale factor applied while decoding, one of none, 2, 4, 8
    #[argh(option, short = 'r', default = "String::from(\"none\")")]
    reduce: String,

    /// encoder quality for jpeg and webp, 1 to 100
    #[argh(option, short = 'q')]
    quality: Option<u8>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    let mode = ColorMode::from_str(&args.mode)?;
    let reduce = ReduceRatio::from_str(&args.reduce)?;
    let format = ImageFormat::from_path(&args.output)
        .ok_or("the output extension does not name a supported codec")?;

    let image = read_image(&args.input, mode, reduce)?;
    log::info!(
        "decoded {} as {} with {} channels ({:?})",
        args.input.display(),
        image.size(),
        image.num_channels(),
        image.dtype(),
    );

    write_image(&args.output, &image, format, args.quality)?;
    log::info!("wrote {}", args.output.display());

    Ok(())
}
