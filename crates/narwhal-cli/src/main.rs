use narwhal::wire::{self, GraphData};
use narwhal::{AlgorithmKind, LayoutResult};
use serde::Serialize;
use std::io::{Read, Write};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Layout(narwhal::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Layout(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<narwhal::Error> for CliError {
    fn from(value: narwhal::Error) -> Self {
        Self::Layout(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Default)]
struct Args {
    help: bool,
    input: Option<String>,
    out: Option<String>,
    algorithm: Option<AlgorithmKind>,
    seed: Option<u64>,
    pretty: bool,
}

fn usage() -> &'static str {
    "narwhal-cli\n\
\n\
USAGE:\n\
  narwhal-cli [-i|--input <path>|-] [--algorithm <name>] [--seed <n>] [--pretty] [<output>|-]\n\
\n\
ALGORITHMS:\n\
  drl (default), fruchterman_reingold (fr), kamada_kawai (kk), circle, grid\n\
\n\
NOTES:\n\
  - The input is a JSON object {\"nodes\": [...], \"links\": [...], \"options\": {\"layout\": {...}}}.\n\
  - If the input is omitted or '-', it is read from stdin.\n\
  - If <output> is omitted or '-', the result is written to stdout.\n\
  - --algorithm and --seed override options.layout; unknown algorithms fall back to drl.\n\
  - Log verbosity follows RUST_LOG (default: info), written to stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => args.help = true,
            "--pretty" => args.pretty = true,
            "--input" | "-i" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.input = Some(path.clone());
            }
            "--algorithm" | "-a" => {
                let Some(name) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.algorithm = Some(AlgorithmKind::parse_or_default(name));
            }
            "--seed" => {
                let Some(seed) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.seed = Some(seed.parse::<u64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "-" => {
                if args.out.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.out = Some(a.clone());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            _ => {
                if args.out.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.out = Some(a.clone());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool, out: Option<&str>) -> Result<(), CliError> {
    let mut writer: Box<dyn Write> = match out {
        None | Some("-") => Box::new(std::io::stdout().lock()),
        Some(path) => Box::new(std::io::BufWriter::new(std::fs::File::create(path)?)),
    };
    if pretty {
        serde_json::to_writer_pretty(&mut writer, value)?;
    } else {
        serde_json::to_writer(&mut writer, value)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    tracing::info!(input = args.input.as_deref().unwrap_or("-"), "loading input");
    let text = read_input(args.input.as_deref())?;
    let mut data: GraphData = serde_json::from_str(&text)?;

    let layout = &mut data.options.layout;
    if let Some(kind) = args.algorithm {
        layout.algorithm = kind;
    }
    if let Some(seed) = args.seed {
        layout.seed = Some(seed);
    }

    tracing::info!(
        nodes = data.nodes.len(),
        links = data.links.len(),
        algorithm = %data.options.layout.algorithm,
        "generating layout"
    );
    let result: LayoutResult = wire::generate_layout(data)?;

    write_json(&result, args.pretty, args.out.as_deref())?;
    tracing::info!(
        output = args.out.as_deref().unwrap_or("-"),
        seconds = result.metadata.execution_time_seconds,
        "layout written"
    );
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };
    if args.help {
        print!("{}", usage());
        return;
    }

    init_logging();
    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{CliError, parse_args};
    use narwhal::AlgorithmKind;

    fn argv(rest: &[&str]) -> Vec<String> {
        std::iter::once("narwhal-cli")
            .chain(rest.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn parses_input_output_and_overrides() {
        let args = parse_args(&argv(&[
            "-i",
            "graph.json",
            "--algorithm",
            "kk",
            "--seed",
            "7",
            "--pretty",
            "out.json",
        ]))
        .unwrap();
        assert_eq!(args.input.as_deref(), Some("graph.json"));
        assert_eq!(args.out.as_deref(), Some("out.json"));
        assert_eq!(args.algorithm, Some(AlgorithmKind::KamadaKawai));
        assert_eq!(args.seed, Some(7));
        assert!(args.pretty);
    }

    #[test]
    fn rejects_bad_arguments() {
        for bad in [
            &["--seed", "x"][..],
            &["--input"][..],
            &["--bogus"][..],
            &["a.json", "b.json"][..],
        ] {
            assert!(matches!(parse_args(&argv(bad)), Err(CliError::Usage(_))), "{bad:?}");
        }
    }

    #[test]
    fn unknown_algorithm_falls_back_to_drl() {
        let args = parse_args(&argv(&["--algorithm", "leiden"])).unwrap();
        assert_eq!(args.algorithm, Some(AlgorithmKind::Drl));
    }
}
