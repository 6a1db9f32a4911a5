use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use chartdash::export;
use chartdash::ingest::{self, Format};
use chartdash::project::{project, DEFAULT_LABEL_FIELDS};
use chartdash::render::{render_chart, ChartKind};
use chartdash::RenderOptions;

#[derive(Parser, Debug)]
#[command(name = "chartdash")]
#[command(about = "Render charts from CSV or JSON tabular data", long_about = None)]
struct Args {
    /// Input file (.csv or .json); use '-' to read from stdin
    input: PathBuf,

    /// Override the format instead of deriving it from the file extension
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Chart kind tag (bar, line, pie, doughnut, radar, bubble, scatter);
    /// unrecognized tags render as bar
    #[arg(long, default_value = "bar")]
    chart: String,

    /// Field to plot; defaults to the second header field
    #[arg(long, default_value = "")]
    field: String,

    /// Label field candidates tried in order (exact, case-sensitive match)
    #[arg(long = "label-field")]
    label_fields: Vec<String>,

    /// Series color (#rrggbb, rgb()/rgba(), or a CSS color name)
    #[arg(long)]
    color: Option<String>,

    /// Chart title
    #[arg(long)]
    title: Option<String>,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Which payload to emit
    #[arg(long, value_enum, default_value = "png")]
    export: Export,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Csv,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => Format::Json,
            FormatArg::Csv => Format::Csv,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum Export {
    /// PNG image of the rendered chart
    Png,
    /// JSON of the derived chart series
    Json,
    /// JSON array of the dataset's records
    DatasetJson,
    /// CSV re-serialization of the dataset
    Csv,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (raw, format) = read_input(&args)?;
    let dataset = ingest::parse(&raw, format).context("Failed to parse input")?;

    let label_fields: Vec<&str> = if args.label_fields.is_empty() {
        DEFAULT_LABEL_FIELDS.to_vec()
    } else {
        args.label_fields.iter().map(String::as_str).collect()
    };
    let chart = project(&dataset, &args.field, &label_fields, args.color.as_deref())
        .context("Failed to derive chart series")?;

    let payload = match args.export {
        Export::Png => {
            let options = RenderOptions {
                width: args.width,
                height: args.height,
                title: args.title.clone(),
            };
            render_chart(&chart, ChartKind::from_tag(&args.chart), &options)
                .context("Failed to render chart")?
        }
        Export::Json => export::chart_to_json(&chart).context("Failed to encode chart JSON")?,
        Export::DatasetJson => {
            export::dataset_to_json(&dataset).context("Failed to encode dataset JSON")?
        }
        Export::Csv => export::dataset_to_csv(&dataset),
    };

    write_output(args.output.as_deref(), &payload)
}

fn read_input(args: &Args) -> Result<(String, Format)> {
    if args.input.as_os_str() == "-" {
        let format = args
            .format
            .ok_or_else(|| anyhow!("--format is required when reading from stdin"))?;
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read from stdin")?;
        Ok((raw, format.into()))
    } else {
        let format = match args.format {
            Some(f) => f.into(),
            None => Format::from_path(&args.input)?,
        };
        let raw = fs::read_to_string(&args.input)
            .with_context(|| format!("Failed to read {}", args.input.display()))?;
        Ok((raw, format))
    }
}

fn write_output(path: Option<&Path>, payload: &[u8]) -> Result<()> {
    match path {
        Some(path) => fs::write(path, payload)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(payload)
                .context("Failed to write to stdout")?;
            handle.flush().context("Failed to flush stdout")
        }
    }
}
