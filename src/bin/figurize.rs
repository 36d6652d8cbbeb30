//! CLI for Figurize - turn a photo into a boxed collectible figure.

use clap::{Args, Parser, Subcommand, ValueEnum};
use figurize::image::ImageFormat;
use figurize::session::{run_request, DEFAULT_TIMEOUT};
use figurize::{
    build_prompt, Environment, FigureClient, FigureConfig, GeminiModel, GeminiProvider,
    GenerationState, ImageProvider, Lighting, Material, Pose, Session, SourceImage, Style,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "figurize")]
#[command(about = "Turn a photo into a boxed collectible figure via Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a figure image from a photo
    Generate(GenerateArgs),

    /// Print the prompt that would be sent, without calling the API
    Prompt(FigureArgs),

    /// List the available styles, poses, materials, environments and lighting
    Options,

    /// Check that the API key and model are usable
    Health(ModelArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Source photo (png, jpeg or webp)
    input: PathBuf,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    figure: FigureArgs,

    #[command(flatten)]
    model: ModelArgs,

    /// Give up on a request after this many seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,

    /// Resubmit this many times after a transient failure
    #[arg(long, default_value_t = 0)]
    retries: u32,
}

#[derive(Args)]
struct FigureArgs {
    /// Art style (id or label, see `figurize options`)
    #[arg(long)]
    style: Option<Style>,

    /// Pose
    #[arg(long)]
    pose: Option<Pose>,

    /// Material
    #[arg(long)]
    material: Option<Material>,

    /// Environment; free text is accepted
    #[arg(long)]
    environment: Option<Environment>,

    /// Lighting
    #[arg(long)]
    lighting: Option<Lighting>,

    /// Item the figure holds
    #[arg(long)]
    held_item: Option<String>,

    /// Text printed on the box
    #[arg(long)]
    box_label: Option<String>,

    /// Start from random presets; explicit flags still win
    #[arg(long)]
    random: bool,
}

#[derive(Args)]
struct ModelArgs {
    /// Gemini model
    #[arg(short, long, value_enum, default_value = "nano-banana")]
    model: ModelArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    NanoBanana,
    NanoBananaPro,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::NanoBanana => GeminiModel::NanoBanana,
            ModelArg::NanoBananaPro => GeminiModel::NanoBananaPro,
        }
    }
}

impl FigureArgs {
    fn to_config(&self) -> FigureConfig {
        let mut config = FigureConfig::default();
        if self.random {
            config.randomize(&mut rand::thread_rng());
        }
        if let Some(style) = self.style {
            config.style = style;
        }
        if let Some(pose) = self.pose {
            config.pose = pose;
        }
        if let Some(material) = self.material {
            config.material = material;
        }
        if let Some(ref environment) = self.environment {
            config.environment = environment.clone();
        }
        if let Some(lighting) = self.lighting {
            config.lighting = lighting;
        }
        if let Some(ref item) = self.held_item {
            config.set_held_item(item);
        }
        if let Some(ref label) = self.box_label {
            config.box_label = label.clone();
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("figurize=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => {
            generate(args, cli.json).await?;
        }
        Commands::Prompt(args) => {
            print_prompt(&args, cli.json)?;
        }
        Commands::Options => {
            list_options(cli.json)?;
        }
        Commands::Health(args) => {
            health(args, cli.json).await?;
        }
    }

    Ok(())
}

async fn generate(args: GenerateArgs, json_output: bool) -> anyhow::Result<()> {
    let config = args.figure.to_config();
    let photo = SourceImage::from_path(&args.input)?;
    let provider = GeminiProvider::builder()
        .model(args.model.model.into())
        .build()?;
    let client = FigureClient::new(provider);
    let timeout = Duration::from_secs(args.timeout);

    let mut session = Session::new(config);
    let mut ticket = session.submit(photo.clone());
    let mut outcome = run_request(&client, &photo, session.config(), timeout).await;

    let mut attempt = 0;
    while let Err(ref e) = outcome {
        if !e.is_retryable() || attempt >= args.retries {
            break;
        }
        attempt += 1;
        tracing::warn!(attempt, max_retries = args.retries, "resubmitting after error: {e}");
        ticket = session
            .regenerate()
            .ok_or_else(|| anyhow::anyhow!("source image was dropped"))?;
        outcome = run_request(&client, &photo, session.config(), timeout).await;
    }
    session.finish(ticket, outcome);

    let result = match session.state() {
        GenerationState::Completed(result) => result,
        GenerationState::Error(message) => {
            anyhow::bail!("Failed to generate figure: {message}")
        }
        other => anyhow::bail!("generation ended in unexpected state: {}", other.as_str()),
    };

    let image = result.to_image()?;
    let output = if args.output.extension().is_none() {
        args.output.with_extension(image.format.extension())
    } else {
        args.output.clone()
    };
    if let Some(ext) = output.extension().and_then(|e| e.to_str()) {
        if ImageFormat::from_extension(ext) != Some(image.format) {
            tracing::warn!(
                "output extension .{ext} does not match generated {} data",
                image.format.mime_type()
            );
        }
    }
    image.save(&output)?;

    if json_output {
        let json = serde_json::json!({
            "success": true,
            "output": output.display().to_string(),
            "size_bytes": image.size(),
            "format": image.format.extension(),
            "model": result.metadata.model,
            "duration_ms": result.metadata.duration_ms,
            "text": result.text,
            "config": session.config(),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!(
            "Generated figure: {} ({} bytes)",
            output.display(),
            image.size()
        );
        if let Some(duration) = result.metadata.duration_ms {
            println!("Duration: {}ms", duration);
        }
        if let Some(ref text) = result.text {
            println!("\n{}", text);
        }
    }

    Ok(())
}

fn print_prompt(args: &FigureArgs, json_output: bool) -> anyhow::Result<()> {
    let config = args.to_config();
    let prompt = build_prompt(&config);

    if json_output {
        let json = serde_json::json!({ "config": config, "prompt": prompt });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("{}", prompt);
    }
    Ok(())
}

fn list_options(json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct OptionInfo<'a> {
        id: &'a str,
        label: &'a str,
    }

    fn infos<'a, T>(items: &'a [T], id: fn(&T) -> &str, label: fn(&T) -> &str) -> Vec<OptionInfo<'a>> {
        items
            .iter()
            .map(|item| OptionInfo {
                id: id(item),
                label: label(item),
            })
            .collect()
    }

    let groups = [
        ("style", infos(Style::ALL, |s| s.as_str(), |s| s.label())),
        ("pose", infos(Pose::ALL, |p| p.as_str(), |p| p.label())),
        ("material", infos(Material::ALL, |m| m.as_str(), |m| m.label())),
        (
            "environment",
            infos(Environment::PRESETS, |e| e.as_str(), |e| e.label()),
        ),
        ("lighting", infos(Lighting::ALL, |l| l.as_str(), |l| l.label())),
    ];

    if json_output {
        let mut map = serde_json::Map::new();
        for (name, items) in &groups {
            map.insert(name.to_string(), serde_json::to_value(items)?);
        }
        map.insert(
            "held_item".into(),
            serde_json::to_value(figurize::figure::PRESET_HELD_ITEMS)?,
        );
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        for (name, items) in &groups {
            println!("{}:", name.to_uppercase());
            for item in items {
                println!("  {:<22} {}", item.id, item.label);
            }
            println!();
        }
        println!("HELD ITEM (free text, presets):");
        println!("  {}", figurize::figure::PRESET_HELD_ITEMS.join(", "));
    }

    Ok(())
}

async fn health(args: ModelArgs, json_output: bool) -> anyhow::Result<()> {
    let provider = GeminiProvider::builder().model(args.model.into()).build()?;
    let outcome = provider.health_check().await;

    if json_output {
        let json = serde_json::json!({
            "provider": provider.name(),
            "model": provider.model().as_str(),
            "healthy": outcome.is_ok(),
            "error": outcome.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        match &outcome {
            Ok(()) => println!("✓ {} ({})", provider.name(), provider.model().as_str()),
            Err(e) => println!("✗ {} ({}): {}", provider.name(), provider.model().as_str(), e),
        }
    }

    Ok(outcome?)
}
