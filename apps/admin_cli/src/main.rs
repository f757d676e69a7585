use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    controller::{BulkDeleteOutcome, BulkDeletePrompt},
    notifications::NotificationCenter,
    rows::{CustomerRow, ListRow, LiveEventRow, OrderRow, PaymentRow, ProductRow},
    session::MountedList,
    settings::load_settings,
    AdminApi, HttpAdminApi,
};
use serde::Serialize;
use shared::domain::{EntityId, EntityKind, SortDirection};
use tracing_subscriber::EnvFilter;

mod output;

#[derive(Parser, Debug)]
#[command(name = "admin_cli", about = "PayOnLive admin console")]
struct Cli {
    /// Overrides `api_url` from payonlive.toml and the environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List {
        kind: EntityKind,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        filter: String,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        desc: bool,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        json: bool,
    },
    Show {
        kind: EntityKind,
        id: String,
    },
    Delete {
        kind: EntityKind,
        id: String,
    },
    BulkDelete {
        kind: EntityKind,
        #[arg(required = true)]
        ids: Vec<String>,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Downloads a spreadsheet; no ids exports everything.
    Export {
        kind: EntityKind,
        ids: Vec<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    Import {
        kind: EntityKind,
        file: PathBuf,
    },
}

#[derive(Debug, Clone)]
struct ListOptions {
    search: String,
    filter: String,
    sort: Option<String>,
    desc: bool,
    page: usize,
    json: bool,
}

struct Console {
    api: Arc<dyn AdminApi>,
    notifications: Arc<NotificationCenter>,
}

impl Console {
    fn flush_notifications(&self) {
        while let Some(notification) = self.notifications.pop_front() {
            eprintln!("{}", output::render_notification(&notification));
        }
    }
}

async fn mount_loaded<R: ListRow>(ctx: &Console) -> Result<MountedList<R>> {
    let mut mounted = MountedList::<R>::mount(ctx.api.clone(), ctx.notifications.clone());
    mounted.wait_idle().await;
    let controller = mounted.controller();
    if let Some(message) = controller.lock().await.state().error() {
        bail!("{message}");
    }
    Ok(mounted)
}

async fn list<R: ListRow + Serialize>(ctx: &Console, options: ListOptions) -> Result<()> {
    if !R::KIND.filters().contains(&options.filter.to_lowercase().as_str()) {
        bail!(
            "unknown filter '{}' for {} (expected one of: {})",
            options.filter,
            R::KIND,
            R::KIND.filters().join(", ")
        );
    }

    let mounted = mount_loaded::<R>(ctx).await?;
    let controller = mounted.controller();
    let mut controller = controller.lock().await;
    controller.set_search(options.search);
    controller.set_filter(options.filter);
    if let Some(key) = options.sort {
        if R::column(&key).is_none() {
            let keys: Vec<&str> = R::COLUMNS.iter().map(|column| column.key).collect();
            bail!(
                "unknown sort key '{key}' for {} (expected one of: {})",
                R::KIND,
                keys.join(", ")
            );
        }
        let direction = if options.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        controller.set_sort(&key, direction);
    }
    controller.set_page(options.page);

    let view = controller.view();
    if options.json {
        println!("{}", serde_json::to_string_pretty(&view.rows)?);
    } else {
        println!("{}", output::render_table(&view.rows));
        println!("{}", output::render_footer(&view, R::KIND.plural()));
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn bulk_delete<R: ListRow>(ctx: &Console, ids: Vec<String>, yes: bool) -> Result<()> {
    let mounted = mount_loaded::<R>(ctx).await?;
    let controller = mounted.controller();

    let prompt = {
        let mut controller = controller.lock().await;
        for id in ids.into_iter().map(EntityId::from) {
            if !controller.items().iter().any(|row| row.id() == &id) {
                eprintln!("skipping unknown {} id '{id}'", R::KIND.label().to_lowercase());
                continue;
            }
            if !controller.is_selected(&id) {
                controller.toggle_row_selection(&id);
            }
        }
        controller.request_bulk_delete()
    };

    let count = match prompt {
        BulkDeletePrompt::NothingSelected => {
            ctx.flush_notifications();
            bail!("nothing to delete");
        }
        BulkDeletePrompt::ConfirmationRequired { ids } => ids.len(),
    };

    if !yes && !confirm(&format!("Delete {count} {}?", R::KIND.plural()))? {
        controller.lock().await.cancel_bulk_delete();
        println!("Cancelled.");
        return Ok(());
    }

    let outcome = mounted.bulk_delete_confirmed().await;
    ctx.flush_notifications();
    match outcome {
        Some(BulkDeleteOutcome::Failed { message }) => bail!(message),
        Some(BulkDeleteOutcome::PartiallyDeleted { failed, .. }) => {
            let failed: Vec<&str> = failed.iter().map(EntityId::as_str).collect();
            bail!("could not delete: {}", failed.join(", "))
        }
        _ => Ok(()),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = load_settings();
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }
    if let Some(token) = cli.token {
        settings.api_token = Some(token);
    }
    let api = HttpAdminApi::new(&settings).context("invalid API settings")?;
    tracing::debug!(base_url = %api.base_url(), "admin client ready");

    let ctx = Console {
        api: Arc::new(api),
        notifications: Arc::new(NotificationCenter::default()),
    };

    let result = match cli.command {
        Command::List {
            kind,
            search,
            filter,
            sort,
            desc,
            page,
            json,
        } => {
            let options = ListOptions {
                search,
                filter,
                sort,
                desc,
                page,
                json,
            };
            match kind {
                EntityKind::Product => list::<ProductRow>(&ctx, options).await,
                EntityKind::Order => list::<OrderRow>(&ctx, options).await,
                EntityKind::Customer => list::<CustomerRow>(&ctx, options).await,
                EntityKind::Payment => list::<PaymentRow>(&ctx, options).await,
                EntityKind::LiveEvent => list::<LiveEventRow>(&ctx, options).await,
            }
        }
        Command::Show { kind, id } => {
            let value = ctx
                .api
                .detail(kind, &EntityId::from(id.as_str()))
                .await
                .with_context(|| format!("failed to load {} '{id}'", kind.label().to_lowercase()))?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Command::Delete { kind, id } => {
            let response = ctx
                .api
                .delete(kind, &EntityId::from(id.as_str()))
                .await
                .with_context(|| format!("failed to delete {} '{id}'", kind.label().to_lowercase()))?;
            println!(
                "{}",
                response
                    .message
                    .unwrap_or_else(|| format!("{} deleted.", kind.label()))
            );
            Ok(())
        }
        Command::BulkDelete { kind, ids, yes } => match kind {
            EntityKind::Product => bulk_delete::<ProductRow>(&ctx, ids, yes).await,
            EntityKind::Order => bulk_delete::<OrderRow>(&ctx, ids, yes).await,
            EntityKind::Customer => bulk_delete::<CustomerRow>(&ctx, ids, yes).await,
            EntityKind::Payment => bulk_delete::<PaymentRow>(&ctx, ids, yes).await,
            EntityKind::LiveEvent => bulk_delete::<LiveEventRow>(&ctx, ids, yes).await,
        },
        Command::Export { kind, ids, out } => {
            let ids = ids.into_iter().map(EntityId::from).collect();
            let bytes = ctx
                .api
                .export(kind, ids)
                .await
                .with_context(|| format!("failed to export {kind}"))?;
            let out = out.unwrap_or_else(|| PathBuf::from(kind.export_file_name()));
            std::fs::write(&out, &bytes)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Saved {} bytes to {}", bytes.len(), out.display());
            Ok(())
        }
        Command::Import { kind, file } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("import.xlsx")
                .to_string();
            let response = ctx
                .api
                .import(kind, file_name, bytes)
                .await
                .with_context(|| format!("failed to import {kind}"))?;
            println!("{}", output::render_import(&response));
            Ok(())
        }
    };

    ctx.flush_notifications();
    result
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    run(Cli::parse()).await
}
