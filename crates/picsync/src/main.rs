use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use picsync_api::HttpRemote;
use picsync_api::RemoteApi as _;
use picsync_core::catalog::DEFAULT_PAGE_SIZE;
use picsync_core::persist::CATALOG_FILE_NAME;
use picsync_core::pipeline::{self, DownloadRun};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "picsync", version, about = "Sync, verify and organize assets from a photo server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download directly-uploaded assets, verify their checksums and persist
    /// the outcome catalog
    Download(DownloadArgs),
    /// Mirror the external library's directory structure as albums
    Albums(AlbumsArgs),
    /// Delete assets a previous run verified, in batches
    Delete(DeleteArgs),
}

#[derive(Args)]
struct ServerArgs {
    /// Server URL, e.g. https://photos.example.com
    server_url: String,
    /// API key with full access
    api_key: String,
}

#[derive(Args)]
struct DownloadArgs {
    #[command(flatten)]
    server: ServerArgs,
    /// Output directory; binaries land under its data/ subdirectory
    #[arg(short, long, default_value = "downloads")]
    output: PathBuf,
    /// Only fetch and persist the asset list, download nothing
    #[arg(long)]
    list_only: bool,
    /// Assets requested per search page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,
}

#[derive(Args)]
struct AlbumsArgs {
    #[command(flatten)]
    server: ServerArgs,
    /// Local mount point of the external library
    library_root: PathBuf,
    /// Also reprocess assets that already belong to some album
    #[arg(long)]
    include_existing: bool,
    /// Assets requested per search page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,
}

#[derive(Args)]
struct DeleteArgs {
    #[command(flatten)]
    server: ServerArgs,
    /// Catalog written by a download run
    #[arg(long, default_value_os_t = default_deletion_file())]
    deletion_file: PathBuf,
    /// Ask the server to delete permanently instead of trashing
    #[arg(long)]
    force: bool,
}

fn default_deletion_file() -> PathBuf {
    PathBuf::from("downloads").join(CATALOG_FILE_NAME)
}

/// Build the gateway and probe connectivity. A probe failure aborts the run
/// before any other call is made.
async fn connect(server: &ServerArgs) -> anyhow::Result<HttpRemote> {
    let api = HttpRemote::new(&server.server_url, &server.api_key)?;
    api.ping()
        .await
        .with_context(|| format!("failed to connect to {}", server.server_url))?;
    info!(server = %server.server_url, "connected");
    Ok(api)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Download(args) => {
            let api = connect(&args.server).await?;
            let run = DownloadRun {
                output_dir: args.output,
                page_size: args.page_size,
                list_only: args.list_only,
            };
            pipeline::run_download(&api, &run).await?;
        }
        Command::Albums(args) => {
            let api = connect(&args.server).await?;
            pipeline::run_albums(
                &api,
                &args.library_root,
                args.page_size,
                !args.include_existing,
            )
            .await?;
        }
        Command::Delete(args) => {
            let api = connect(&args.server).await?;
            pipeline::run_delete(&api, &args.deletion_file, args.force).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn download_defaults() {
        let cli = Cli::parse_from(["picsync", "download", "https://p.example.com", "key"]);
        match cli.command {
            Command::Download(args) => {
                assert_eq!(args.output, PathBuf::from("downloads"));
                assert_eq!(args.page_size, DEFAULT_PAGE_SIZE);
                assert!(!args.list_only);
            }
            _ => panic!("expected download subcommand"),
        }
    }

    #[test]
    fn delete_defaults_to_download_output() {
        let cli = Cli::parse_from(["picsync", "delete", "https://p.example.com", "key"]);
        match cli.command {
            Command::Delete(args) => {
                assert_eq!(
                    args.deletion_file,
                    PathBuf::from("downloads").join("downloaded_assets.json")
                );
                assert!(!args.force);
            }
            _ => panic!("expected delete subcommand"),
        }
    }
}
