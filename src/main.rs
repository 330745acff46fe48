use clap::Parser;
use tokio::sync::mpsc;

use nestup::cli::{Cli, Commands};
use nestup::commands::{self, UploadEvent};
use nestup::errors::{AppError, AppResult};
use nestup::{config, database, history};

#[tokio::main]
async fn main() {
    env_logger::Builder::new()
        .filter_level(config::log_level_filter())
        .parse_default_env()
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Upload { file } => {
            // An unavailable history store should not block the upload itself
            if let Err(e) = database::init_database().await {
                log::error!("Failed to initialize history database: {}", e);
            }

            let (events, mut receiver) = mpsc::unbounded_channel();
            commands::upload_image(file, events)?;

            // The flow owns the only sender; the channel closes when it is done
            let mut uploaded = false;
            while let Some(event) = receiver.recv().await {
                match event {
                    UploadEvent::UploadOk { url } => {
                        uploaded = true;
                        println!("{}", url);
                    }
                    UploadEvent::Status { message } => eprintln!("{}", message),
                    UploadEvent::DeleteOk => {}
                }
            }

            if !uploaded {
                std::process::exit(1);
            }
        }
        Commands::Delete { name, token } => {
            let (file_name, token) = match (name, token) {
                (Some(name), None) => {
                    if let Err(e) = database::init_database().await {
                        log::warn!("Failed to initialize history database: {}", e);
                    }
                    let token = history::deletion_token_for(&name).await?;
                    (name, token)
                }
                (None, Some(token)) => (String::new(), token),
                _ => {
                    return Err(AppError::validation(
                        "delete",
                        "Provide a history name or --token",
                    ));
                }
            };

            let (events, mut receiver) = mpsc::unbounded_channel();
            commands::delete_image(&file_name, &token, &events)?;
            drop(events);

            while let Some(event) = receiver.recv().await {
                match event {
                    UploadEvent::DeleteOk => println!("Deletion request opened in the browser."),
                    UploadEvent::Status { message } => eprintln!("{}", message),
                    UploadEvent::UploadOk { .. } => {}
                }
            }
        }
        Commands::History => {
            database::init_database().await?;

            let entries = commands::get_history().await?;
            if entries.is_empty() {
                println!("No uploads recorded.");
            }
            for entry in entries {
                println!(
                    "{}  {}  {}",
                    entry.uploaded_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.file_name,
                    entry.public_url
                );
            }
        }
        Commands::Forget { name } => {
            database::init_database().await?;
            commands::forget_upload(&name).await?;
            println!("Removed {}", name);
        }
        Commands::Cleanup { days } => {
            database::init_database().await?;
            let removed = commands::cleanup_old_data(days).await?;
            println!("Removed {} old history entries.", removed);
        }
        Commands::Config { set_secret } => match set_secret {
            Some(secret) => {
                let mut app_config = commands::get_app_config()?;
                app_config.upload_client_secret = secret;
                commands::save_app_config(app_config)?;
                println!("Upload client secret saved.");
            }
            None => {
                let app_config = commands::get_app_config()?;
                let secret_state = if app_config.upload_client_secret.is_empty() {
                    "(not set)"
                } else {
                    "(set)"
                };
                println!("upload_client_secret: {}", secret_state);
                println!("auto_cleanup_days: {}", app_config.auto_cleanup_days);
            }
        },
    }

    Ok(())
}
