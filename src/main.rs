use std::path::{Path, PathBuf};
use std::sync::Arc;

use canvas::binding::{self, DataMap};
use canvas::doc::{ElementContent, LayoutDefinition, LayoutError};
use canvas::presets::{CardSizePreset, create_default_layout};
use canvas::preview;
use canvas::print::{self, PrintOptions};
use canvas::raster::{self, RasterError};
use cardstudio::api::{ApiError, TemplateClient, TemplateStore};
use cardstudio::config::{ApiConfig, ConfigError};
use cardstudio::server;
use cardstudio::session::{EditorSession, SessionError};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("page not found: {0}")]
    PageNotFound(String),
    #[error("server failed: {0}")]
    Serve(std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "cardstudio", about = "Member card template tooling")]
struct Cli {
    /// Overrides `CARDSTUDIO_API_BASE_URL`.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the starter layout for a card-size preset.
    New {
        #[arg(long, default_value = "STANDARD")]
        preset: CardSizePreset,
        #[arg(long, help = "Output file, stdout when omitted")]
        out: Option<PathBuf>,
    },
    /// Check a layout file for structural problems.
    Validate { layout: PathBuf },
    /// Render a layout as a standalone print document.
    Print(PrintArgs),
    /// Rasterize one page of a layout to PNG.
    ExportPng(ExportPngArgs),
    /// Work with templates stored on the admin backend.
    Templates(TemplatesCommand),
    /// Serve previews of a layout over HTTP.
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct DataArgs {
    #[arg(long, help = "JSON object of binding values; sample member data when omitted")]
    data: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PrintArgs {
    layout: PathBuf,
    #[command(flatten)]
    data: DataArgs,
    #[arg(long, default_value = "Card preview")]
    title: String,
    #[arg(long, default_value_t = false)]
    auto_print: bool,
    #[arg(long, help = "Output file, stdout when omitted")]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExportPngArgs {
    layout: PathBuf,
    #[command(flatten)]
    data: DataArgs,
    #[arg(long, default_value = "front", help = "Page name or zero-based index")]
    page: String,
    #[arg(long, default_value_t = 2.0)]
    scale: f64,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ServeArgs {
    layout: PathBuf,
    #[command(flatten)]
    data: DataArgs,
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,
}

#[derive(Args, Debug)]
struct TemplatesCommand {
    #[command(subcommand)]
    command: TemplatesSubcommand,
}

#[derive(Subcommand, Debug)]
enum TemplatesSubcommand {
    List {
        plan_id: i64,
    },
    Pull {
        plan_id: i64,
        template_id: i64,
        #[arg(long, help = "Output file, stdout when omitted")]
        out: Option<PathBuf>,
    },
    /// Create a template from a layout file, or update one with `--id`.
    Push {
        plan_id: i64,
        layout: PathBuf,
        #[arg(long)]
        id: Option<i64>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value = "STANDARD")]
        preset: CardSizePreset,
    },
    Delete {
        plan_id: i64,
        template_id: i64,
    },
    SetDefault {
        plan_id: i64,
        template_id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    // A missing .env is normal; only report one that exists but is malformed.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!(error = %e, ".env could not be loaded");
        }
    }

    let cli = Cli::parse();
    match cli.command {
        Command::New { preset, out } => {
            let layout = create_default_layout(preset);
            write_output(out.as_deref(), layout.to_json_pretty()?.as_bytes())
        }
        Command::Validate { layout } => run_validate(&layout),
        Command::Print(args) => run_print(args),
        Command::ExportPng(args) => run_export_png(args),
        Command::Templates(templates) => {
            let mut config = ApiConfig::from_env()?;
            if let Some(base_url) = cli.base_url.as_deref() {
                config = config.with_base_url(base_url)?;
            }
            let store: Arc<dyn TemplateStore> = Arc::new(TemplateClient::new(&config)?);
            run_templates(store, templates).await
        }
        Command::Serve(args) => run_serve(args).await,
    }
}

fn run_validate(path: &Path) -> Result<(), CliError> {
    let layout = read_layout(path)?;
    layout.validate()?;
    let unknown: usize = layout
        .pages
        .iter()
        .flat_map(|p| &p.elements)
        .filter(|e| matches!(e.content, ElementContent::Unknown { .. }))
        .count();
    for page in &layout.pages {
        println!("{}: {} element(s), background {}", page.name, page.elements.len(), page.background_color);
    }
    if unknown > 0 {
        println!("{unknown} element(s) of unrecognized type will be kept as-is");
    }
    println!("ok");
    Ok(())
}

fn run_print(args: PrintArgs) -> Result<(), CliError> {
    let layout = read_layout(&args.layout)?;
    let data = read_data(&args.data)?;
    let options = PrintOptions { title: args.title, auto_print: args.auto_print };
    let html = print::document(&layout, &data, &options);
    write_output(args.out.as_deref(), html.as_bytes())
}

fn run_export_png(args: ExportPngArgs) -> Result<(), CliError> {
    let layout = read_layout(&args.layout)?;
    let data = read_data(&args.data)?;
    let Some(page) = server::resolve_page(&layout, &args.page).and_then(|i| layout.pages.get(i)) else {
        return Err(CliError::PageNotFound(args.page));
    };
    let scene = preview::render(page, &layout.card_size, &data, args.scale);
    let png = raster::export_png(&scene)?;
    write_output(Some(&args.out), &png)?;
    tracing::info!(page = %page.name, scale = args.scale, bytes = png.len(), out = %args.out.display(), "page exported");
    Ok(())
}

async fn run_templates(store: Arc<dyn TemplateStore>, templates: TemplatesCommand) -> Result<(), CliError> {
    match templates.command {
        TemplatesSubcommand::List { plan_id } => {
            for template in store.list(plan_id).await? {
                let marker = if template.is_default { "*" } else { " " };
                println!("{marker} {:>6}  {}  ({} page(s))", template.id, template.name, template.page_count());
            }
            Ok(())
        }
        TemplatesSubcommand::Pull { plan_id, template_id, out } => {
            let template = store.get(plan_id, template_id).await?;
            write_output(out.as_deref(), template.layout_definition.to_json_pretty()?.as_bytes())
        }
        TemplatesSubcommand::Push { plan_id, layout, id, name, description, preset } => {
            let imported = read_layout(&layout)?;
            let mut session = match id {
                Some(template_id) => EditorSession::open(store, plan_id, template_id).await?,
                None => {
                    let name = name.as_deref().unwrap_or("Untitled template");
                    EditorSession::create(store, plan_id, name, preset)
                }
            };
            if let Some(name) = &name {
                session.rename(name);
            }
            if description.is_some() {
                session.set_description(description.as_deref());
            }
            session.replace_layout(imported);
            tracing::info!(
                plan_id = session.plan_id(),
                template_id = ?session.template_id(),
                pages = session.layout().pages.len(),
                "pushing card template"
            );
            let saved = session.save().await?;
            let sides = if saved.is_double_sided() { "double-sided" } else { "single-sided" };
            println!("saved template {} ({}, {sides})", saved.id, session.meta().name);
            Ok(())
        }
        TemplatesSubcommand::Delete { plan_id, template_id } => {
            store.delete(plan_id, template_id).await?;
            println!("deleted template {template_id}");
            Ok(())
        }
        TemplatesSubcommand::SetDefault { plan_id, template_id } => {
            store.set_default(plan_id, template_id).await?;
            println!("template {template_id} is now the default for plan {plan_id}");
            Ok(())
        }
    }
}

async fn run_serve(args: ServeArgs) -> Result<(), CliError> {
    let layout = read_layout(&args.layout)?;
    let data = read_data(&args.data)?;
    let title = args.layout.file_stem().map_or_else(|| "Card preview".to_owned(), |s| s.to_string_lossy().into_owned());
    let app = server::app(server::PreviewState::new(layout, data, &title));

    let port = args.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await.map_err(CliError::Serve)?;
    tracing::info!(%port, layout = %args.layout.display(), "cardstudio preview listening");
    axum::serve(listener, app).await.map_err(CliError::Serve)
}

// =============================================================================
// FILE HELPERS
// =============================================================================

fn io_error(path: &Path, source: std::io::Error) -> CliError {
    CliError::Io { path: path.display().to_string(), source }
}

fn read_layout(path: &Path) -> Result<LayoutDefinition, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    Ok(LayoutDefinition::from_json(&text)?)
}

fn read_data(args: &DataArgs) -> Result<DataMap, CliError> {
    let Some(path) = &args.data else {
        return Ok(binding::sample_data());
    };
    let text = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    Ok(serde_json::from_str(&text)?)
}

fn write_output(out: Option<&Path>, bytes: &[u8]) -> Result<(), CliError> {
    match out {
        Some(path) => std::fs::write(path, bytes).map_err(|e| io_error(path, e)),
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes).map_err(|e| io_error(Path::new("<stdout>"), e))?;
            stdout.write_all(b"\n").map_err(|e| io_error(Path::new("<stdout>"), e))
        }
    }
}
