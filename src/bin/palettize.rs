//! palettize CLI - palette quantization tool
//!
//! Reads an 8-bit PNG, reduces it to at most 256 colors and writes an
//! indexed PNG or a single-frame GIF.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, ValueEnum};

use palettize::gif::GifEncoderAdapter;
use palettize::png::{PngIndexedEncoder, PngOptions};
use palettize::quantize::{
    DistanceMetric, FallbackQuantizer, FastQuantizer, MedianCutQuantizer, QuantizationConfig,
    Quantizer, DEFAULT_MAX_ATTEMPTS,
};
use palettize::{IndexedImage, RasterBuffer};

/// Reduce a PNG to a bounded palette and write indexed PNG or GIF.
#[derive(Parser, Debug)]
#[command(name = "palettize")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input image file (8-bit PNG)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file path (format detected from extension)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Output format (overrides extension detection)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Maximum palette size
    #[arg(short = 'n', long, default_value = "256", value_parser = clap::value_parser!(u16).range(1..=256))]
    colors: u16,

    /// Starting levels per RGB channel (0 = keep all 256)
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u16).range(0..=256))]
    crush: u16,

    /// Starting levels for translucent alpha (0 = keep all 256)
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u16).range(0..=256))]
    crush_alpha: u16,

    /// Ordered dithering while crushing
    #[arg(long)]
    dither: bool,

    /// Maximum number of quantization passes
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Use median cut when the palette cannot be reached by crushing
    #[arg(long)]
    fallback: bool,

    /// Remap metric for median cut
    #[arg(long, value_enum, default_value = "rgba")]
    metric: MetricArg,

    /// PNG compression level (0-9, higher = smaller file)
    #[arg(short = 'c', long, default_value = "6", value_parser = clap::value_parser!(u8).range(0..=9))]
    compression: u8,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Indexed PNG
    Png,
    /// Single-frame GIF
    Gif,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MetricArg {
    /// Plain squared distance over RGBA
    Rgba,
    /// Perceptually weighted RGB plus alpha
    Weighted,
}

impl From<MetricArg> for DistanceMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Rgba => DistanceMetric::Rgba,
            MetricArg::Weighted => DistanceMetric::WeightedRgb,
        }
    }
}

/// Decode a PNG file to RGBA8.
fn decode_png(path: &Path) -> Result<RasterBuffer, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut decoder = png::Decoder::new(file);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());

    let rgba = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        png::ColorType::Indexed => return Err("Indexed PNG was not expanded".into()),
    };

    Ok(RasterBuffer::new(info.width, info.height, rgba)?)
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    let start = Instant::now();
    let raster = decode_png(&args.input)?;
    log::info!(
        "loaded {:?}: {}x{} in {:.2?}",
        args.input,
        raster.width(),
        raster.height(),
        start.elapsed()
    );

    let format = determine_format(&args);
    let output_path = args.output.clone().unwrap_or_else(|| {
        let mut path = args.input.clone();
        let ext = match format {
            OutputFormat::Png => "png",
            OutputFormat::Gif => "gif",
        };
        path.set_extension(format!("indexed.{}", ext));
        path
    });

    let config = QuantizationConfig {
        crush_rgb: args.crush,
        crush_alpha: args.crush_alpha,
        dither: args.dither,
        target_colors: args.colors,
        max_attempts: args.max_attempts,
    };

    let quantize_start = Instant::now();
    let indexed = quantize(&raster, config, &args)?;
    let quantize_time = quantize_start.elapsed();

    let has_alpha = indexed.palette().has_transparency();
    let encode_start = Instant::now();
    let output_data = match format {
        OutputFormat::Png => PngIndexedEncoder::new(PngOptions {
            compression_level: args.compression,
        })
        .encode_indexed(&indexed, has_alpha)?,
        OutputFormat::Gif => GifEncoderAdapter::new().encode_indexed(&indexed, has_alpha)?,
    };
    let encode_time = encode_start.elapsed();

    fs::write(&output_path, &output_data)?;

    let input_size = fs::metadata(&args.input)?.len();
    let output_size = output_data.len() as u64;
    let ratio = if input_size > 0 {
        (output_size as f64 / input_size as f64) * 100.0
    } else {
        0.0
    };

    if args.verbose {
        eprintln!("Output: {:?}", output_path);
        eprintln!("  Format: {:?}", format);
        eprintln!("  Colors: {}", indexed.palette().len());
        eprintln!("  Transparency: {}", has_alpha);
        eprintln!("  Quantize time: {:.2?}", quantize_time);
        eprintln!("  Encode time: {:.2?}", encode_time);
        eprintln!(
            "  Size: {} -> {} ({:.1}%)",
            format_size(input_size),
            format_size(output_size),
            ratio
        );
    } else {
        println!(
            "{} -> {} ({:.1}%)",
            format_size(input_size),
            format_size(output_size),
            ratio
        );
    }

    Ok(())
}

fn quantize(
    raster: &RasterBuffer,
    config: QuantizationConfig,
    args: &Args,
) -> Result<IndexedImage, Box<dyn std::error::Error>> {
    if args.fallback {
        let secondary = MedianCutQuantizer::new(config.target_colors, args.metric.into());
        let mut quantizer = FallbackQuantizer::new(FastQuantizer::new(config), secondary);
        return Ok(quantizer.quantize(raster)?);
    }

    let (image, stats) = FastQuantizer::new(config).quantize_with_stats(raster)?;
    log::info!(
        "fast quantizer: {} colors, {} attempt(s), rgb divisor {}, alpha divisor {}",
        stats.colors,
        stats.attempts,
        stats.rgb_divisor,
        stats.alpha_divisor
    );
    Ok(image)
}

fn determine_format(args: &Args) -> OutputFormat {
    args.format.unwrap_or_else(|| {
        args.output
            .as_ref()
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .and_then(|e| match e.to_lowercase().as_str() {
                "png" => Some(OutputFormat::Png),
                "gif" => Some(OutputFormat::Gif),
                _ => None,
            })
            .unwrap_or(OutputFormat::Png)
    })
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primaries() -> RasterBuffer {
        let pixels = vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 255,
        ];
        RasterBuffer::new(2, 2, pixels).unwrap()
    }

    fn config(args: &Args) -> QuantizationConfig {
        QuantizationConfig {
            target_colors: args.colors,
            max_attempts: args.max_attempts,
            ..QuantizationConfig::default()
        }
    }

    #[test]
    fn test_fallback_flag_uses_median_cut() {
        let args = Args::parse_from(["palettize", "in.png", "-n", "2", "--fallback"]);
        let image = quantize(&primaries(), config(&args), &args).unwrap();
        assert!(image.palette().len() <= 2);
        assert_eq!(image.indices().len(), 4);
    }

    #[test]
    fn test_without_fallback_reports_unreachable() {
        let args = Args::parse_from(["palettize", "in.png", "-n", "2"]);
        let err = quantize(&primaries(), config(&args), &args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<palettize::Error>(),
            Some(palettize::Error::PaletteUnreachable { .. })
        ));
    }

    #[test]
    fn test_format_from_extension() {
        let args = Args::parse_from(["palettize", "in.png", "-o", "out.GIF"]);
        assert_eq!(determine_format(&args), OutputFormat::Gif);
    }
}
