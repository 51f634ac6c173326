use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use k5e_rjsf_core::{
    normalize_fields, ClientOptions, ConvertOptions, FormSchema, FormSchemaGenerator,
    RawFormFields, RjsfConverter, SchemaConverter,
};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "k5e-rjsf")]
#[command(about = "Convert kintone form fields into a react-jsonschema-form JSON Schema and UI Schema")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch an app's form fields from kintone and convert them
    Generate {
        /// kintone app ID
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        app: u64,

        /// kintone domain, e.g. example.cybozu.com
        #[arg(long, env = "K5E_DOMAIN")]
        domain: String,

        /// API token with read access to the app's form settings
        #[arg(long, env = "K5E_API_TOKEN", hide_env_values = true)]
        api_token: Option<String>,

        /// Base URL override (e.g. a local proxy); defaults to https://<domain>
        #[arg(long, env = "K5E_BASE_URL")]
        base_url: Option<String>,

        /// Label language requested from the API
        #[arg(long, default_value = "default")]
        lang: String,

        #[command(flatten)]
        convert: ConvertArgs,
    },

    /// Convert a saved form-fields API response without contacting kintone
    Convert {
        /// Response body of GET /k/v1/app/form/fields.json
        input: PathBuf,

        #[command(flatten)]
        convert: ConvertArgs,
    },
}

#[derive(Args)]
struct ConvertArgs {
    /// Output file (defaults to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,

    /// Conversion options file (JSON, kebab-case keys); flags below override it
    #[arg(long)]
    options: Option<PathBuf>,

    /// Emit minLength/maxLength and minimum/maximum constraints
    #[arg(long)]
    constraints: bool,

    /// Emit default values
    #[arg(long)]
    defaults: bool,

    /// Expand SUBTABLE fields into arrays of objects
    #[arg(long)]
    expand_subtables: bool,

    /// Add ui:enumNames to choice fields
    #[arg(long)]
    enum_names: bool,

    /// Dropdown placeholder text
    #[arg(long)]
    placeholder: Option<String>,
}

impl ConvertArgs {
    fn convert_options(&self) -> Result<ConvertOptions> {
        let mut options = match &self.options {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open options file: {}", path.display()))?;
                serde_json::from_reader(BufReader::new(file))
                    .with_context(|| format!("Failed to parse options from: {}", path.display()))?
            }
            None => ConvertOptions::default(),
        };

        options.include_constraints |= self.constraints;
        options.include_defaults |= self.defaults;
        options.expand_subtables |= self.expand_subtables;
        options.enum_names |= self.enum_names;
        if let Some(placeholder) = &self.placeholder {
            options.placeholder = placeholder.clone();
        }
        Ok(options)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Pretty,
    Compact,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for JSON
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            app,
            domain,
            api_token,
            base_url,
            lang,
            convert,
        } => {
            let client = ClientOptions {
                domain,
                api_token,
                base_url,
                lang,
            };
            let generator =
                FormSchemaGenerator::from_client_options(&client, convert.convert_options()?);

            let form = generator.generate_form_schema(app).await.map_err(|e| {
                let code = serde_json::to_string(&e.code()).unwrap_or_default();
                anyhow::Error::from(e).context(format!("Generation failed ({code})"))
            })?;

            write_json(&form, convert.output.as_ref(), convert.format)?;
        }
        Commands::Convert { input, convert } => {
            let file = File::open(&input)
                .with_context(|| format!("Failed to open input file: {}", input.display()))?;
            let raw: RawFormFields = serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse form fields from: {}", input.display()))?;

            let fields = normalize_fields(raw, 0)
                .map_err(|e| anyhow::Error::from(e).context("Invalid form fields"))?;

            let converter = RjsfConverter::new(convert.convert_options()?);
            let form = FormSchema {
                json_schema: converter
                    .to_json_schema(&fields)
                    .map_err(|e| anyhow::Error::from(e).context("Conversion failed"))?,
                ui_schema: converter
                    .to_ui_schema(&fields)
                    .map_err(|e| anyhow::Error::from(e).context("Conversion failed"))?,
            };

            write_json(&form, convert.output.as_ref(), convert.format)?;
        }
    }

    Ok(())
}

fn write_json<T: serde::Serialize>(
    val: &T,
    path: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let mut writer: Box<dyn Write> = if let Some(p) = path {
        let file = File::create(p)
            .with_context(|| format!("Failed to create output file: {}", p.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };

    match format {
        OutputFormat::Pretty => {
            serde_json::to_writer_pretty(&mut writer, val).context("Failed to write JSON")?;
        }
        OutputFormat::Compact => {
            serde_json::to_writer(&mut writer, val).context("Failed to write JSON")?;
        }
    }

    writeln!(writer).context("Failed to write trailing newline")?;
    writer.flush().context("Failed to flush output")?;

    Ok(())
}
