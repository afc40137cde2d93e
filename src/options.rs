//! Command-line options and their resolution into [`Settings`].

use std::{
    ffi::OsString,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use clap::{ArgAction, Parser};

use crate::core::Direction;

pub const PRODUCT: &str = "eolconv";

/// Prefix of the temporary output file used in overwrite mode.
pub const TEMP_FILE_PREFIX: &str = "convert";

/// eolconv - convert line endings between LF and CRLF
#[derive(Parser, Debug)]
#[command(name = PRODUCT, about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Input file name (standard input if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output file name (standard output if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Conversion direction: `crlf` (LF to CRLF) or `lf` (CRLF to LF)
    #[arg(short, long, default_value = "crlf", value_name = "DIRECTION")]
    pub direction: Direction,

    /// Print line and byte statistics after converting
    #[arg(short, long)]
    pub statistics: bool,

    /// Write the converted output over the input file (requires -i; cannot be combined with -o)
    #[arg(short = 'w', long, requires = "input", conflicts_with = "output")]
    pub overwrite: bool,

    /// Display version
    #[arg(short = 'v', long = "version", action = ArgAction::SetTrue)]
    pub version: bool,
}

/// Validated run configuration. Built once, then only read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub overwrite_input: bool,
    pub statistics: bool,
    pub direction: Direction,
}

/// What the driver should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No arguments were given.
    Usage,
    /// `-v` was the only argument.
    Version,
    Convert {
        settings: Settings,
        show_version: bool,
    },
}

impl From<Cli> for Settings {
    fn from(cli: Cli) -> Self {
        let output = if cli.overwrite {
            Some(temp_output_path())
        } else {
            cli.output
        };
        Self {
            input: cli.input.filter(|p| !p.as_os_str().is_empty()),
            output: output.filter(|p| !p.as_os_str().is_empty()),
            overwrite_input: cli.overwrite,
            statistics: cli.statistics,
            direction: cli.direction,
        }
    }
}

/// Resolve raw process arguments (including the program name).
///
/// # Errors
///
/// Unknown flags, missing values and conflicting flags produce a
/// `clap::Error`; `-h` also comes back this way so the caller can `exit()`
/// with clap's status code.
pub fn resolve_from<I, T>(args: I) -> Result<Resolution, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if args.len() <= 1 {
        return Ok(Resolution::Usage);
    }

    let cli = Cli::try_parse_from(&args)?;
    if cli.version && args.len() == 2 {
        return Ok(Resolution::Version);
    }

    let show_version = cli.version;
    Ok(Resolution::Convert {
        settings: cli.into(),
        show_version,
    })
}

/// Product name and release line.
#[must_use]
pub fn version_text() -> String {
    format!(
        "{PRODUCT} - convert line endings utility\n{PRODUCT} {} release 1\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// Name for the throwaway output of overwrite mode, in the working directory.
///
/// Only the millisecond clock tells two runs apart, so two overwrite runs
/// started in the same millisecond from the same directory would collide.
#[must_use]
pub fn temp_output_path() -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    PathBuf::from(format!(".{TEMP_FILE_PREFIX}.{millis}"))
}
