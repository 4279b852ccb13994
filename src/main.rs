mod app;
mod cli;
mod completions;
mod config;
mod db;
mod domain;
mod form;
mod logging;
mod record_id;
mod store;
mod tracker;
mod ui;

use serde_json::json;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), app::AppError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| app::AppError::InvalidArgument(format!("unable to render JSON: {err}")))?;
    println!("{rendered}");
    Ok(())
}

async fn run() -> Result<(), app::AppError> {
    use clap::Parser;
    use cli::Commands;
    use domain::record::format_duration;

    let cli = cli::Cli::parse();
    logging::init(&cli.log_level);

    if let Commands::Completions(args) = &cli.command {
        return completions::run_completions_command(args.shell.as_deref(), args.install);
    }

    let backend = config::load(cli.config.as_deref(), &cli.overrides())?;
    let mut app = app::App::open(&backend)?;
    app.load().await;

    match cli.command {
        Commands::Ls(args) => {
            let records = app.tracker().records();
            if args.json {
                print_json(&json!({
                    "records": records,
                    "total": app.tracker().total_time(),
                }))?;
            } else {
                ui::print_listing(records, app.tracker().is_loading());
            }
        }
        Commands::Add(args) => {
            let record = app.add(&args.title, &args.time).await?;
            if args.json {
                print_json(&record)?;
            } else {
                ui::print_saved("created", &record);
            }
        }
        Commands::Edit(args) => {
            let record = app
                .edit(&args.id, args.title.as_deref(), args.time.as_deref())
                .await?;
            if args.json {
                print_json(&record)?;
            } else {
                ui::print_saved("updated", &record);
            }
        }
        Commands::Rm(args) => {
            app.remove(&args.id).await?;
            println!("deleted {}", args.id);
        }
        Commands::Total(args) => {
            let total = app.tracker().total_time();
            if args.json {
                print_json(&json!({
                    "total": total,
                    "display": format_duration(total),
                }))?;
            } else {
                ui::print_total(total);
            }
        }
        Commands::Completions(_) => unreachable!("handled before the store is opened"),
    }

    Ok(())
}
