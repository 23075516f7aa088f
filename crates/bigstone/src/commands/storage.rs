use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::cli::StorageCommands;
use crate::config::Config;
use crate::store::{StorageService, SupabaseClient};

pub fn run(command: StorageCommands) -> Result<()> {
    let config = Config::load_or_default();
    let backend = config.backend()?;
    let session = config.session();
    let client = SupabaseClient::new(backend.url, backend.anon_key).with_session(&session);
    let storage = StorageService::new(client);

    match command {
        StorageCommands::Upload { bucket, file, name } => {
            let bucket = resolve_bucket(bucket, &config)?;
            let bytes = read_file(&file)?;
            let name = match name {
                Some(name) => name,
                None => file_name(&file)?,
            };
            let uploaded = storage.upload(&session, &bucket, &name, &bytes)?;
            println!("{} {}", "Uploaded".green().bold(), uploaded.path);
            println!("{}", storage.public_url(&bucket, &uploaded.path));
        }
        StorageCommands::Url { bucket, path } => {
            let bucket = resolve_bucket(bucket, &config)?;
            println!("{}", storage.public_url(&bucket, &path));
        }
        StorageCommands::Delete { bucket, path } => {
            let bucket = resolve_bucket(bucket, &config)?;
            storage.delete(&session, &bucket, &path)?;
            println!("{} {bucket}/{path}", "Deleted".green().bold());
        }
        StorageCommands::Image { bucket, file } => {
            let bucket = resolve_bucket(bucket, &config)?;
            let bytes = read_file(&file)?;
            let name = file_name(&file)?;
            let url = storage.upload_image_with_preview(&session, &bucket, &name, &bytes)?;
            println!("{url}");
        }
    }
    Ok(())
}

fn resolve_bucket(flag: Option<String>, config: &Config) -> Result<String> {
    flag.or_else(|| config.default_bucket().map(str::to_string))
        .context("No bucket given. Pass --bucket or run `bigstone config set defaults.bucket <name>`.")
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("Not a file name: {}", path.display()))
}
