//! mukai - Chern character arithmetic on polarized surfaces
//!
//! Command-line front end for `mukai-core`: cup products, inverses, twisted
//! Chern characters, central charges, Euler characteristics and hom
//! dimensions of line bundles, ideal sheaves and skyscraper sheaves.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{debug, info};
use mukai_core::{
    chi, hom, parse_object, ChargeMode, CohomologyClass, Object, Scalar, StabilityCondition,
};
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;

mod config;

use config::{ConfigLoader, LogLevel, MukaiConfig, OutputFormat};

#[derive(Parser)]
#[command(
    name = "mukai",
    version = env!("CARGO_PKG_VERSION"),
    about = "Chern character and stability arithmetic on polarized surfaces",
    long_about = r#"
mukai computes with truncated Chern characters (rank, c1, ch2) on a surface
whose polarization H has self-intersection d.

Objects are written as:
  O(n)        line bundle O(n)
  I(n,len)    ideal sheaf of len general points, twisted by n
  k           skyscraper sheaf of a point
  (r,c,s)     raw class; entries may be fractions such as -1/2

Examples:
  mukai class 'O(2)' --degree 4          # Chern character and Mukai vector
  mukai cup 'O(1)' 'I(0,3)'              # cup product
  mukai pow 'O(1)' -1                    # inverse
  mukai charge 'I(1,2)' --bridgeland --alpha 1 --beta -1/2
  mukai hom 'O(0)' 'O(2)' --degree 4     # dimension of Hom
  mukai config generate > .mukai.toml
"#,
    after_help = r#"
Environment Variables:
  MUKAI_CONFIG=<path>     Configuration file
  MUKAI_DEGREE=<d>        Surface degree
  MUKAI_ALPHA=<a>         Bridgeland alpha
  MUKAI_BETA=<b>          Twist beta
  MUKAI_BRIDGELAND=1      Use the Bridgeland central charge
  MUKAI_OUTPUT=json       Output format (text, json)
  MUKAI_LOG_LEVEL=debug   Log level (error, warn, info, debug, trace)
  MUKAI_DEBUG=1           Enable debug logging
"#
)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Surface degree H²
    #[arg(long, global = true)]
    degree: Option<i64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Set log level
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevel>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Show the Chern character and Mukai vector of an object
    Class {
        #[arg(allow_hyphen_values = true)]
        object: String,
    },
    /// Cup product of two objects
    Cup {
        #[arg(allow_hyphen_values = true)]
        left: String,
        #[arg(allow_hyphen_values = true)]
        right: String,
    },
    /// Divide by a class of rank ±1
    Div {
        #[arg(allow_hyphen_values = true)]
        left: String,
        #[arg(allow_hyphen_values = true)]
        right: String,
    },
    /// Integer power of a class
    Pow {
        #[arg(allow_hyphen_values = true)]
        object: String,
        /// Exponent; negative values invert first
        #[arg(allow_hyphen_values = true)]
        exponent: String,
    },
    /// Twisted Chern character ch(0..2, beta)
    Ch {
        #[arg(allow_hyphen_values = true)]
        object: String,
        #[arg(long, allow_hyphen_values = true)]
        beta: Option<String>,
    },
    /// Central charge Z and slope mu
    Charge {
        #[arg(allow_hyphen_values = true)]
        object: String,
        #[arg(long, allow_hyphen_values = true)]
        alpha: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        beta: Option<String>,
        /// Use the Bridgeland central charge instead of Mumford
        #[arg(long)]
        bridgeland: bool,
        /// Degree used inside Z (defaults to the surface degree)
        #[arg(long)]
        charge_degree: Option<String>,
    },
    /// Euler characteristic chi(A, B)
    Chi {
        #[arg(allow_hyphen_values = true)]
        left: String,
        #[arg(allow_hyphen_values = true)]
        right: String,
    },
    /// Dimension of Hom(A, B)
    Hom {
        #[arg(allow_hyphen_values = true)]
        left: String,
        #[arg(allow_hyphen_values = true)]
        right: String,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        config_command: ConfigCommand,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Print a sample configuration file
    Generate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Config {
        config_command: ConfigCommand::Generate,
    } = cli.command
    {
        println!("{}", ConfigLoader::generate_sample_config());
        return Ok(());
    }

    let mut config = ConfigLoader::load(cli.config.as_deref())?;
    apply_cli_overrides(&mut config, &cli);
    config.validate()?;

    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .filter_level(config.log_filter())
        .format(format_log_record)
        .init();

    info!("mukai v{} starting", env!("CARGO_PKG_VERSION"));
    debug!("Configuration loaded: {config:?}");

    let output = execute(&cli.command, &config)?;
    match config.output.format {
        OutputFormat::Text => println!("{}", output.text),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output.json)?),
    }
    Ok(())
}

fn apply_cli_overrides(config: &mut MukaiConfig, cli: &Cli) {
    if let Some(degree) = cli.degree {
        config.surface.degree = degree;
    }
    if cli.json {
        config.output.format = OutputFormat::Json;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.debug {
        config.logging.debug = true;
    }
}

/// A command result in both renderings
struct Output {
    text: String,
    json: serde_json::Value,
}

fn execute(command: &Commands, config: &MukaiConfig) -> Result<Output> {
    let degree = config.surface.degree;

    let output = match command {
        Commands::Class { object: input } => {
            let obj = parse_input(input, degree)?;
            let class = obj.class();
            let [v0, v1, v2] = class.mukai();
            Output {
                text: format!("{obj}: ch = {class}, v = ({v0}, {v1}, {v2})"),
                json: json!({
                    "object": obj.to_string(),
                    "degree": degree,
                    "chern_character": class_json(&class),
                    "mukai": [v0.to_string(), v1.to_string(), v2.to_string()],
                }),
            }
        }
        Commands::Cup { left, right } => {
            let left = parse_input(left, degree)?.class();
            let right = parse_input(right, degree)?.class();
            class_output(left.cup(&right))
        }
        Commands::Div { left, right } => {
            let left = parse_input(left, degree)?.class();
            let right = parse_input(right, degree)?.class();
            class_output(left.checked_div(&right)?)
        }
        Commands::Pow { object: input, exponent } => {
            let exponent: Scalar = exponent
                .parse()
                .with_context(|| format!("Invalid exponent '{exponent}'"))?;
            class_output(parse_input(input, degree)?.class().pow_scalar(exponent)?)
        }
        Commands::Ch { object: input, beta } => {
            let beta = match beta {
                Some(beta) => parse_beta(beta)?,
                None => config.stability.to_condition()?.beta,
            };
            let class = parse_input(input, degree)?.class();
            let values = (0..3)
                .map(|l| class.ch(l, beta).map(|v| v.to_string()))
                .collect::<mukai_core::Result<Vec<String>>>()?;
            Output {
                text: format!("ch(b = {beta}) = ({})", values.join(", ")),
                json: json!({ "beta": beta.to_string(), "ch": values }),
            }
        }
        Commands::Charge {
            object: input,
            alpha,
            beta,
            bridgeland,
            charge_degree,
        } => {
            let mut condition = config.stability.to_condition()?;
            if let Some(alpha) = alpha {
                if !alpha.is_finite() {
                    bail!("Invalid alpha '{alpha}': must be finite");
                }
                condition.alpha = *alpha;
            }
            if let Some(beta) = beta {
                condition.beta = parse_beta(beta)?;
            }
            if *bridgeland {
                condition.mode = ChargeMode::Bridgeland;
            }
            if let Some(d) = charge_degree {
                let d: Scalar = d
                    .parse()
                    .with_context(|| format!("Invalid charge degree '{d}'"))?;
                condition = condition.with_degree(d);
            }
            charge_output(&parse_input(input, degree)?.class(), &condition)
        }
        Commands::Chi { left, right } => {
            let left = parse_input(left, degree)?.class();
            let right = parse_input(right, degree)?.class();
            let value = chi(&left, &right, degree);
            Output {
                text: value.to_string(),
                json: json!({ "chi": value.to_string() }),
            }
        }
        Commands::Hom { left, right } => {
            let (left, right) = (parse_input(left, degree)?, parse_input(right, degree)?);
            let value = hom(left.as_sheaf()?, right.as_sheaf()?)?;
            Output {
                text: value.to_string(),
                json: json!({ "hom": value }),
            }
        }
        Commands::Config { config_command } => match config_command {
            ConfigCommand::Show => Output {
                text: toml::to_string_pretty(config)?,
                json: serde_json::to_value(config)?,
            },
            ConfigCommand::Generate => Output {
                text: ConfigLoader::generate_sample_config(),
                json: serde_json::to_value(MukaiConfig::default())?,
            },
        },
    };
    Ok(output)
}

fn parse_input(input: &str, degree: i64) -> Result<Object> {
    parse_object(input, degree).with_context(|| format!("Invalid object '{input}'"))
}

fn parse_beta(beta: &str) -> Result<Scalar> {
    let value: Scalar = beta
        .parse()
        .with_context(|| format!("Invalid beta '{beta}'"))?;
    if !value.is_finite() {
        bail!("Invalid beta '{beta}': must be finite");
    }
    Ok(value)
}

fn class_json(class: &CohomologyClass) -> serde_json::Value {
    let components: Vec<String> = class.components().iter().map(|c| c.to_string()).collect();
    json!(components)
}

fn class_output(class: CohomologyClass) -> Output {
    Output {
        text: class.to_string(),
        json: json!({
            "degree": class.degree().to_string(),
            "chern_character": class_json(&class),
        }),
    }
}

fn charge_output(class: &CohomologyClass, condition: &StabilityCondition) -> Output {
    let z = class.central_charge(condition);
    let mu = class.slope(condition);
    Output {
        text: format!("Z = {} + {}i\nmu = {}", z.re, z.im, mu),
        json: json!({
            "mode": condition.mode,
            "alpha": condition.alpha,
            "beta": condition.beta.to_string(),
            "z": { "re": z.re, "im": z.im },
            "mu": slope_json(mu),
        }),
    }
}

// JSON has no infinity or NaN
fn slope_json(mu: f64) -> serde_json::Value {
    if mu.is_nan() {
        serde_json::Value::Null
    } else if mu.is_infinite() {
        json!(if mu > 0.0 { "inf" } else { "-inf" })
    } else {
        json!(mu)
    }
}

fn format_log_record(
    buf: &mut env_logger::fmt::Formatter,
    record: &log::Record,
) -> std::io::Result<()> {
    let timestamp = buf.timestamp_millis();
    writeln!(
        buf,
        "[{} {:>5} {}] {}",
        timestamp,
        record.level(),
        record.target(),
        record.args()
    )
}
