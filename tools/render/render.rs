//! Offline renderer: runs a WAV file through the filter.
//!
//! Usage: bilinear_render <input.wav> <output.wav> [preset name | config.json]

use anyhow::{Context, Result};
use bilinear_eq::dsp::utils::{frame_rms, gain_to_db};
use bilinear_eq::{BiLinearFilter, FilterConfig, FilterPresets, ProcessSetup};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::{Path, PathBuf};

const BLOCK_SIZE: usize = 512;

fn load_config(arg: Option<String>) -> Result<FilterConfig> {
    let Some(arg) = arg else {
        return Ok(FilterConfig::default());
    };

    if Path::new(&arg).extension().is_some_and(|ext| ext == "json") {
        let json = std::fs::read_to_string(&arg)
            .with_context(|| format!("failed to read config '{}'", arg))?;
        return FilterConfig::from_json_str(&json);
    }

    let presets = FilterPresets::new();
    presets.get(&arg).copied().with_context(|| {
        format!(
            "unknown preset '{}', available: {}",
            arg,
            presets.names().join(", ")
        )
    })
}

fn read_channels(path: &Path) -> Result<(WavSpec, Vec<Vec<f32>>)> {
    let reader = WavReader::open(path)
        .with_context(|| format!("failed to open input WAV '{}'", path.display()))?;
    let spec = reader.spec();
    let num_channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = 1.0 / (1_i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    let mut channels = vec![Vec::with_capacity(interleaved.len() / num_channels); num_channels];
    for frame in interleaved.chunks(num_channels) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }
    Ok((spec, channels))
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .map(PathBuf::from)
        .context("missing input WAV path")?;
    let output = args
        .next()
        .map(PathBuf::from)
        .context("missing output WAV path")?;
    let config = load_config(args.next())?;

    let (spec, input_channels) = read_channels(&input)?;
    let num_channels = input_channels.len();
    let num_samples = input_channels.first().map_or(0, Vec::len);

    let mut filter = BiLinearFilter::<f32>::new();
    filter.prepare(&ProcessSetup::new(
        spec.sample_rate as f64,
        BLOCK_SIZE,
        num_channels,
    )?);
    config.apply(&mut filter);
    filter.settle_parameters();

    let mut output_channels = vec![vec![0.0_f32; num_samples]; num_channels];
    let mut start = 0;
    while start < num_samples {
        let end = (start + BLOCK_SIZE).min(num_samples);
        let inputs: Vec<&[f32]> = input_channels.iter().map(|c| &c[start..end]).collect();
        let mut outputs: Vec<&mut [f32]> = output_channels
            .iter_mut()
            .map(|c| &mut c[start..end])
            .collect();
        filter.process(&inputs, &mut outputs, false);
        start = end;
    }

    let out_spec = WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(&output, out_spec)
        .with_context(|| format!("failed to create output WAV '{}'", output.display()))?;
    for i in 0..num_samples {
        for channel in &output_channels {
            writer.write_sample(channel[i])?;
        }
    }
    writer.finalize()?;

    println!("Render summary for '{}':", input.display());
    println!("  filter           : {:?} / {:?}", config.filter_type, config.transform_type);
    println!("  frequency        : {:.1} Hz", config.frequency_hz);
    println!("  gain             : {:.2} dB", gain_to_db(config.linear_gain()));
    println!("  frames processed : {}", num_samples);
    for (ch, (inp, out)) in input_channels.iter().zip(&output_channels).enumerate() {
        println!(
            "  ch{} rms in/out   : {:.2} / {:.2} dBFS",
            ch,
            gain_to_db(frame_rms(inp)),
            gain_to_db(frame_rms(out))
        );
    }
    Ok(())
}
