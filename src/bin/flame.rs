use clap::{App, Arg, ArgMatches};
use failure::{err_msg, Error};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use flame::{
    render_batch, Affine, Color, Genome, GenomeBuilder, Histogram, ToneMode, Variation,
};

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn validate_variations(s: &str) -> Result<(), String> {
    for name in s.split(',') {
        if let Err(e) = Variation::from_name(name, &[]) {
            return Err(e.to_string());
        }
    }
    Ok(())
}

const SIZE: &str = "size";
const SUPERSAMPLE: &str = "supersample";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";
const TRANSFORMS: &str = "transforms";
const VARIATIONS: &str = "variations";
const SEED: &str = "seed";
const TONE: &str = "tone";
const GAMMA: &str = "gamma";
const FINAL: &str = "final";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("flame")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Fractal flame renderer")
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("320x240")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse screen size"))
                .help("Size of the screen"),
        )
        .arg(
            Arg::with_name(SUPERSAMPLE)
                .long(SUPERSAMPLE)
                .short("a")
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        1usize,
                        4,
                        "Could not parse supersample factor",
                        "Supersample factor must be between 1 and 4",
                    )
                })
                .help("Histogram cells per screen pixel, along each axis"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of worker threads"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("200000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1_000u64,
                        100_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1000 and 100000000",
                    )
                })
                .help("Chaos game steps per thread"),
        )
        .arg(
            Arg::with_name(TRANSFORMS)
                .long(TRANSFORMS)
                .short("n")
                .takes_value(true)
                .default_value("3")
                .validator(|s| {
                    validate_range(
                        &s,
                        1usize,
                        12,
                        "Could not parse transform count",
                        "Transform count must be between 1 and 12",
                    )
                })
                .help("Number of affine transforms in the random genome"),
        )
        .arg(
            Arg::with_name(VARIATIONS)
                .long(VARIATIONS)
                .short("v")
                .takes_value(true)
                .default_value("linear,sinusoidal,spherical")
                .validator(|s| validate_variations(&s))
                .help("Comma-separated variation names"),
        )
        .arg(
            Arg::with_name(SEED)
                .long(SEED)
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        0u64,
                        std::u64::MAX,
                        "Could not parse seed",
                        "Seed out of range",
                    )
                })
                .help("Seed for the genome and the workers"),
        )
        .arg(
            Arg::with_name(TONE)
                .long(TONE)
                .takes_value(true)
                .default_value("log")
                .possible_values(&["log", "linear", "none"])
                .help("Tone mapping mode"),
        )
        .arg(
            Arg::with_name(GAMMA)
                .long(GAMMA)
                .short("g")
                .takes_value(true)
                .default_value("2.2")
                .validator(|s| {
                    validate_range(
                        &s,
                        0.01f64,
                        10.0,
                        "Could not parse gamma",
                        "Gamma must be between 0.01 and 10",
                    )
                })
                .help("Gamma for log tone mapping"),
        )
        .arg(
            Arg::with_name(FINAL)
                .long(FINAL)
                .short("f")
                .help("Add a final transform to every affine transform"),
        )
        .get_matches()
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    matches
        .value_of(name)
        .and_then(|s| T::from_str(s).ok())
        .ok_or_else(|| err_msg(format!("Could not parse --{}", name)))
}

fn random_affine(rng: &mut StdRng) -> Affine {
    Affine::new(
        rng.gen_range(-1.0, 1.0),
        rng.gen_range(-1.0, 1.0),
        rng.gen_range(-1.0, 1.0),
        rng.gen_range(-1.0, 1.0),
        rng.gen_range(-1.0, 1.0),
        rng.gen_range(-1.0, 1.0),
    )
}

fn random_color(rng: &mut StdRng) -> Color {
    Color::new(rng.gen(), rng.gen(), rng.gen())
}

/// Stands in for whatever would normally design the flame: random
/// transforms, colors, weights and variation mix.
fn random_genome(matches: &ArgMatches, rng: &mut StdRng) -> Result<Genome, Error> {
    let transforms: usize = value(matches, TRANSFORMS)?;
    let tone: ToneMode = value::<String>(matches, TONE)?.parse()?;
    let gamma: f64 = value(matches, GAMMA)?;
    let with_final = matches.is_present(FINAL);

    let mut builder = GenomeBuilder::new().tone_mode(tone).gamma(gamma);
    let mut weights = Vec::with_capacity(transforms);
    for _ in 0..transforms {
        builder = builder.transform(random_affine(rng), random_color(rng));
        weights.push(rng.gen_range(0.1, 1.0));
        if with_final {
            builder = builder.final_transform(random_affine(rng), random_color(rng));
        }
    }
    builder = builder
        .weights(&weights, 1000)
        .final_transform_enabled(with_final);

    let names: String = value(matches, VARIATIONS)?;
    for name in names.split(',') {
        let id = Variation::from_name(name, &[])?.id();
        let params: Vec<f64> = (0..4).map(|_| rng.gen_range(-2.0, 2.0)).collect();
        builder = builder
            .variation(id, rng.gen_range(0.1, 1.0))
            .variation_parameters(id, &params);
    }

    Ok(builder.build()?)
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let (width, height) = matches
        .value_of(SIZE)
        .and_then(|s| parse_pair::<usize>(s, 'x'))
        .ok_or_else(|| err_msg("Error parsing screen size"))?;
    let supersample: usize = value(matches, SUPERSAMPLE)?;
    let threads: usize = value(matches, THREADS)?;
    let iterations: u64 = value(matches, ITERATIONS)?;
    let seed = match matches.value_of(SEED) {
        Some(s) => Some(u64::from_str(s).map_err(|_| err_msg("Could not parse seed"))?),
        None => None,
    };

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let genome = random_genome(matches, &mut rng)?;
    let histogram = Histogram::new(width, height, supersample)?;

    info!(width, height, supersample, threads, iterations, "rendering");
    let worker_seed = seed.map(|s| s.wrapping_add(1));
    let stats = render_batch(&genome, &histogram, threads, iterations, worker_seed);
    let frame = histogram.render_to_pixels(&genome);

    println!(
        "flame: {}x{} (supersample {}), {} threads",
        width, height, supersample, threads
    );
    println!(
        "iterations: {}  plotted: {}  reseeds: {}",
        stats.iterations, stats.plotted, stats.reseeds
    );
    println!(
        "hits: {}  lit pixels: {} of {}",
        histogram.total_hits(),
        frame.lit(),
        frame.pixels().len()
    );
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
