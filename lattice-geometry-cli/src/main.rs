use std::io::{self, Read};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::{fs, str::FromStr};

use anyhow::{Context, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use geo::coord;
use lattice_geometry::{
    CodecBounds, Delta, LatticePoint, PolylineVariant, SegmentDistanceMetric,
    SimplificationAlgorithm, encode, simplify_polyline, try_decode,
};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "lattice-geometry", author, version, about, long_about = None)]
struct Cli {
    /// Subcommand/tool to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Delta code a JSON list of lattice points ([[x, y], ...])
    Encode {
        #[command(flatten)]
        codec: CodecArgs,

        /// Input file, or - for stdin
        input: PathBuf,
    },
    /// Reconstruct lattice points from a JSON list of deltas ([[dx, dy], ...])
    Decode {
        #[command(flatten)]
        codec: CodecArgs,

        /// Input file, or - for stdin
        input: PathBuf,
    },
    /// Simplify a JSON polyline ([[x, y], ...]), keeping both endpoints
    Simplify {
        #[arg(long, value_enum, env = "LATTICE_SIMPLIFY_ALGORITHM", default_value_t = Algorithm::DouglasPeucker)]
        algorithm: Algorithm,

        /// Distance tolerance, in input units
        #[arg(long, env = "LATTICE_SIMPLIFY_EPSILON")]
        epsilon: f64,

        /// Failed candidates after which the near-optimal search gives up on a start point
        #[arg(long, env = "LATTICE_SIMPLIFY_LOOK_AHEAD", default_value = "20")]
        look_ahead: NonZeroUsize,

        /// Input file, or - for stdin
        input: PathBuf,
    },
}

#[derive(Args, Debug)]
struct CodecArgs {
    #[arg(long, value_enum, env = "LATTICE_VARIANT")]
    variant: Variant,

    /// Lattice point the first prediction is made from (x,y)
    #[arg(long, env = "LATTICE_BASE", value_parser = parse_lattice_point, default_value = "0,0")]
    base: LatticePoint,

    /// Largest lattice coordinates (x,y)
    #[arg(long, env = "LATTICE_MAX", value_parser = parse_lattice_point)]
    max: LatticePoint,
}

impl CodecArgs {
    fn bounds(&self) -> anyhow::Result<CodecBounds> {
        Ok(CodecBounds::try_new(self.base, self.max)?)
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Variant {
    Prev1,
    Prev2,
    Prev3,
    TriangleStrip,
}

impl From<Variant> for PolylineVariant {
    fn from(value: Variant) -> Self {
        match value {
            Variant::Prev1 => PolylineVariant::Prev1,
            Variant::Prev2 => PolylineVariant::Prev2,
            Variant::Prev3 => PolylineVariant::Prev3,
            Variant::TriangleStrip => PolylineVariant::TriangleStrip,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Algorithm {
    #[value(name = "dp")]
    DouglasPeucker,
    NearOptimal,
}

fn parse_lattice_point(input: &str) -> anyhow::Result<LatticePoint> {
    let Some((x, y)) = input.split_once(',') else {
        return Err(anyhow!("Expected a lattice point of the form x,y"));
    };
    let x = u32::from_str(x.trim()).context("invalid x coordinate")?;
    let y = u32::from_str(y.trim()).context("invalid y coordinate")?;
    Ok(coord! { x: x, y: y })
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read stdin")?;
        Ok(input)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Rejects input the encoder treats as a contract violation.
fn check_encodable(
    variant: PolylineVariant,
    bounds: &CodecBounds,
    points: &[LatticePoint],
) -> anyhow::Result<()> {
    let max = bounds.max();
    if let Some(index) = points.iter().position(|p| p.x > max.x || p.y > max.y) {
        bail!("Point {index} lies outside the lattice {bounds}");
    }

    match variant {
        PolylineVariant::TriangleStrip if matches!(points.len(), 1 | 2) => {
            bail!(
                "A triangle strip needs 0 or at least 3 points; got {}",
                points.len()
            );
        }
        PolylineVariant::Prev3 => {
            // The last two points never serve as the base of a circular prediction.
            let predictors = &points[..points.len().saturating_sub(2)];
            if let Some(index) = predictors.windows(2).position(|pair| pair[0] == pair[1]) {
                bail!(
                    "Points {index} and {} coincide, which the circular predictor cannot follow",
                    index + 1
                );
            }
        }
        _ => {}
    }
    Ok(())
}

fn run_encode(codec: &CodecArgs, input: &Path) -> anyhow::Result<()> {
    let variant = PolylineVariant::from(codec.variant);
    let bounds = codec.bounds()?;
    let points: Vec<LatticePoint> =
        serde_json::from_str::<Vec<[u32; 2]>>(&read_input(input)?)
            .context("Expected a JSON list of [x, y] lattice points")?
            .into_iter()
            .map(|[x, y]| coord! { x: x, y: y })
            .collect();
    check_encodable(variant, &bounds, &points)?;

    let mut deltas = Vec::with_capacity(points.len());
    encode(variant, &points, &bounds, &mut deltas);
    info!(?variant, %bounds, count = points.len(), "Encoded points");

    let output: Vec<[i64; 2]> = deltas.iter().map(|delta| [delta.x, delta.y]).collect();
    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

fn run_decode(codec: &CodecArgs, input: &Path) -> anyhow::Result<()> {
    let variant = PolylineVariant::from(codec.variant);
    let bounds = codec.bounds()?;
    let deltas: Vec<Delta> = serde_json::from_str::<Vec<[i64; 2]>>(&read_input(input)?)
        .context("Expected a JSON list of [dx, dy] deltas")?
        .into_iter()
        .map(|[x, y]| coord! { x: x, y: y })
        .collect();

    let mut points = Vec::with_capacity(deltas.len());
    try_decode(variant, &deltas, &bounds, &mut points)
        .with_context(|| format!("Unable to decode {variant:?} stream with {bounds}"))?;
    info!(?variant, %bounds, count = points.len(), "Decoded points");

    let output: Vec<[u32; 2]> = points.iter().map(|point| [point.x, point.y]).collect();
    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

fn run_simplify(
    algorithm: Algorithm,
    epsilon: f64,
    look_ahead: NonZeroUsize,
    input: &Path,
) -> anyhow::Result<()> {
    if !(epsilon.is_finite() && epsilon > 0.0) {
        bail!("The tolerance must be finite and positive; got {epsilon}");
    }
    let algorithm = match algorithm {
        Algorithm::DouglasPeucker => SimplificationAlgorithm::DouglasPeucker,
        Algorithm::NearOptimal => SimplificationAlgorithm::NearOptimal {
            max_false_look_ahead: look_ahead,
        },
    };

    let points: Vec<_> = serde_json::from_str::<Vec<[f64; 2]>>(&read_input(input)?)
        .context("Expected a JSON list of [x, y] points")?
        .into_iter()
        .map(|[x, y]| coord! { x: x, y: y })
        .collect();

    let simplified = simplify_polyline(&points, algorithm, &SegmentDistanceMetric, epsilon);
    info!(
        ?algorithm,
        epsilon,
        before = points.len(),
        after = simplified.len(),
        "Simplified polyline"
    );

    let output: Vec<[f64; 2]> = simplified.iter().map(|point| [point.x, point.y]).collect();
    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        // Standard logger, configured via the RUST_LOG env variable.
        // Logs go to stderr so they never mix with the JSON on stdout.
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { codec, input } => run_encode(&codec, &input),
        Commands::Decode { codec, input } => run_decode(&codec, &input),
        Commands::Simplify {
            algorithm,
            epsilon,
            look_ahead,
            input,
        } => run_simplify(algorithm, epsilon, look_ahead, &input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lattice_point() {
        assert_eq!(
            parse_lattice_point("12, 34").unwrap(),
            coord! { x: 12, y: 34 }
        );
        assert!(parse_lattice_point("12").is_err());
        assert!(parse_lattice_point("-1,3").is_err());
        assert!(parse_lattice_point("1,4294967296").is_err());
    }

    #[test]
    fn test_cli_arguments() {
        let cli = Cli::try_parse_from([
            "lattice-geometry",
            "encode",
            "--variant",
            "triangle-strip",
            "--base",
            "5,5",
            "--max",
            "100,100",
            "-",
        ])
        .unwrap();
        let Commands::Encode { codec, input } = cli.command else {
            panic!("Expected the encode subcommand");
        };
        assert_eq!(
            PolylineVariant::from(codec.variant),
            PolylineVariant::TriangleStrip
        );
        assert_eq!(codec.base, coord! { x: 5, y: 5 });
        assert_eq!(input, PathBuf::from("-"));

        let cli = Cli::try_parse_from([
            "lattice-geometry",
            "simplify",
            "--algorithm",
            "near-optimal",
            "--epsilon",
            "0.5",
            "line.json",
        ])
        .unwrap();
        let Commands::Simplify {
            algorithm,
            look_ahead,
            ..
        } = cli.command
        else {
            panic!("Expected the simplify subcommand");
        };
        assert!(matches!(algorithm, Algorithm::NearOptimal));
        assert_eq!(look_ahead.get(), 20);
    }

    #[test]
    fn test_check_encodable() {
        let bounds = CodecBounds::from_max(coord! { x: 10, y: 10 });
        let point = |x, y| coord! { x: x, y: y };

        assert!(check_encodable(PolylineVariant::Prev1, &bounds, &[point(11, 0)]).is_err());
        assert!(
            check_encodable(
                PolylineVariant::TriangleStrip,
                &bounds,
                &[point(0, 0), point(1, 1)]
            )
            .is_err()
        );

        // Repeats in the final two points never feed a circular prediction.
        let tail_repeat = [point(0, 0), point(1, 0), point(2, 2), point(2, 2)];
        assert!(check_encodable(PolylineVariant::Prev3, &bounds, &tail_repeat).is_ok());
        let mut deltas = Vec::new();
        encode(PolylineVariant::Prev3, &tail_repeat, &bounds, &mut deltas);

        let early_repeat = [point(0, 0), point(0, 0), point(2, 2), point(3, 3)];
        assert!(check_encodable(PolylineVariant::Prev3, &bounds, &early_repeat).is_err());
    }
}
