mod config;
mod render;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    pagination::PageState,
    staging::FileHandle,
    view::{render_detail, render_list, render_pagination, render_staged_file, DespachoDetail},
    ControllerEvent, DespachoController, Download, HttpBackend, NotificationLevel,
};
use shared::domain::{DocumentId, DocumentTypeHint, AUTOMATIC_TYPE_HINT};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "despachos", about = "Despacho document workflow console")]
struct Args {
    /// Config file (defaults to ./despachos.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    page_size: Option<u32>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List despachos, one page at a time.
    List {
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one despacho; offers an SGD import when it is unknown.
    Show {
        numero: String,
        #[arg(long)]
        import: bool,
    },
    Create {
        numero: String,
    },
    /// Upload a PDF. `automatico` lets the backend split and classify it.
    Upload {
        numero: String,
        file: PathBuf,
        #[arg(long, default_value = AUTOMATIC_TYPE_HINT)]
        tipo: String,
    },
    /// Process one document, or every pending one.
    Process {
        numero: String,
        #[arg(long)]
        document: Option<i64>,
        /// Reprocess documents that were already processed.
        #[arg(long)]
        force: bool,
    },
    Sync {
        numero: String,
    },
    Export {
        numero: String,
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    Pdf {
        numero: String,
        document: i64,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportFormat {
    Json,
    Excel,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(api_url) = &args.api_url {
        settings.api_base_url = api_url.clone();
    }
    if let Some(page_size) = args.page_size {
        settings.page_size = page_size.max(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let backend = HttpBackend::new(&settings.api_base_url, settings.request_timeout())
        .with_context(|| format!("invalid api url '{}'", settings.api_base_url))?;
    info!(api = %backend.base_url(), "despachos: console starting");
    let controller = DespachoController::new(Arc::new(backend), settings.page_size);
    let mut events = controller.subscribe_events();

    let result = run(&controller, &settings, args.command).await;
    print_notifications(&mut events);
    result
}

async fn run(
    controller: &DespachoController,
    settings: &Settings,
    command: Command,
) -> Result<()> {
    match command {
        Command::List { page, search } => {
            let listing = match search {
                Some(query) => controller.search_page(&query, page).await?,
                None => controller.load_page(page).await?,
            };
            print_list(&listing.rows, &controller.page_state().await);
        }
        Command::Show { numero, import } => match controller.search_specific(&numero).await? {
            Some(detail) => print_detail(&detail),
            None if import => {
                let outcome = controller.import_from_sgd(&numero).await?;
                if let Some(detail) = outcome.detail {
                    print_detail(&detail);
                }
            }
            None => {
                println!("Despacho {numero} no existe. Use --import para traerlo desde SGD.")
            }
        },
        Command::Create { numero } => {
            let detail = controller.create(&numero).await?;
            print_detail(&detail);
        }
        Command::Upload { numero, file, tipo } => {
            controller.select(&numero).await?;
            let handle = FileHandle::from_path(&file).await?;
            controller.stage_file(handle).await?;
            let staged = controller.staged_file().await;
            print!("{}", render::render_text(&render_staged_file(staged.as_ref())));
            let outcome = controller.upload(DocumentTypeHint::parse(&tipo)).await?;
            if let Some(detail) = outcome.detail {
                print_detail(&detail);
            }
        }
        Command::Process {
            numero,
            document,
            force,
        } => {
            controller.select(&numero).await?;
            let detail = match document {
                Some(id) => controller.process_document(DocumentId(id)).await?.detail,
                None => controller.process_all(force).await?.detail,
            };
            if let Some(detail) = detail {
                print_detail(&detail);
            }
        }
        Command::Sync { numero } => {
            controller.select(&numero).await?;
            if let Some(detail) = controller.synchronize_external().await?.detail {
                print_detail(&detail);
            }
        }
        Command::Export {
            numero,
            format,
            out_dir,
        } => {
            controller.select(&numero).await?;
            let download = match format {
                ExportFormat::Json => controller.export_json().await?,
                ExportFormat::Excel => controller.export_excel().await?,
            };
            let dir = out_dir.unwrap_or_else(|| settings.download_dir.clone());
            save_download(&download, &dir).await?;
        }
        Command::Pdf {
            numero,
            document,
            out_dir,
        } => {
            controller.select(&numero).await?;
            let download = controller.document_pdf(DocumentId(document)).await?;
            let dir = out_dir.unwrap_or_else(|| settings.download_dir.clone());
            save_download(&download, &dir).await?;
        }
    }
    Ok(())
}

fn print_list(rows: &[shared::protocol::DespachoSummary], page: &PageState) {
    print!("{}", render::render_text(&render_list(rows)));
    let pagination = page.pagination();
    let links = render::render_page_links(&render_pagination(&pagination));
    println!(
        "Página {} de {} ({} despachos){}",
        pagination.page,
        pagination.total_pages.max(1),
        pagination.total,
        if links.is_empty() {
            String::new()
        } else {
            format!("  {links}")
        }
    );
}

fn print_detail(detail: &DespachoDetail) {
    let nodes = render_detail(detail);
    print!("{}", render::render_text(&nodes));
    let hints = render::action_hints(&nodes, detail.numero().as_str());
    if !hints.is_empty() {
        println!();
        for hint in hints {
            println!("  $ {hint}");
        }
    }
}

async fn save_download(download: &Download, dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("cannot create '{}'", dir.display()))?;
    let path = dir.join(&download.file_name);
    tokio::fs::write(&path, &download.bytes)
        .await
        .with_context(|| format!("cannot write '{}'", path.display()))?;
    info!(path = %path.display(), bytes = download.bytes.len(), "despachos: download saved");
    println!("{} ({})", path.display(), download.content_type);
    Ok(())
}

fn print_notifications(events: &mut broadcast::Receiver<ControllerEvent>) {
    while let Ok(event) = events.try_recv() {
        if let ControllerEvent::Notification(notification) = event {
            let tag = match notification.level {
                NotificationLevel::Info => "…",
                NotificationLevel::Success => "✓",
                NotificationLevel::Warning => "!",
                NotificationLevel::Error => "✗",
            };
            eprintln!("{tag} {}", notification.message);
        }
    }
}
