mod cli;

use crate::cli::{build_cli, CliCommand, UploadCmd};
use albumsync::api::GraphApi;
use albumsync::config::Config;
use albumsync::file::load_upload_requests;
use albumsync::identity::{EnvIdentity, IdentityProvider};
use albumsync::labeler::RekognitionLabeler;
use albumsync::memory::MemoryGraph;
use albumsync::render;
use albumsync::s3_store::StoreClient;
use albumsync::store::ObjectStore;
use albumsync::sync_error::{Result, SyncError};
use albumsync::upload::PhotoUploader;
use albumsync::utils::rewrite_message;
use albumsync::viewmodel::{AlbumDetailViewModel, AlbumListViewModel};
use std::io::stdout;
use std::process::exit;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let matches = build_cli();
    let config = Config::from_env().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration due to error = {}", err);
        exit(1);
    });

    let cmd = CliCommand::from_str(matches.subcommand_name().unwrap_or_else(|| {
        eprintln!("No parameter was provided, run `albumsync help` to learn more");
        exit(1);
    }));

    let result = match cmd {
        Ok(CliCommand::Upload) => {
            let c = UploadCmd::build(
                matches.subcommand_matches(CliCommand::Upload.to_str()).unwrap(),
            );
            upload(config, &c).await
        }
        Err(invalid_cmd) => {
            Err(SyncError::InvalidInput(format!("Command {} is not valid", invalid_cmd)))
        }
    };

    println!();
    match result {
        Ok(_) => exit(0),
        Err(err) => {
            eprintln!("❌  Failed due to error='{}'", err);
            exit(1);
        }
    }
}

async fn upload(config: Config, cmd: &UploadCmd) -> Result<()> {
    // Subscriptions are scoped to the signed-in user; nothing runs without one.
    let identity = EnvIdentity.current_user().await?;

    let graph: Arc<dyn GraphApi> = Arc::new(MemoryGraph::new(config.page_size));
    let store: Arc<dyn ObjectStore> = Arc::new(StoreClient::new(config.region.clone())?);

    let mut list = AlbumListViewModel::new(Arc::clone(&graph), identity.clone());
    list.activate().await?;
    let album = list.create_album(&cmd.album_name).await?;

    let requests = load_upload_requests(&cmd.folder_name).await?;
    println!("loaded {} photos", requests.len());
    if requests.is_empty() {
        println!("No photos to add");
        return Ok(());
    }

    // Open the detail view before uploading so the photo subscription is the
    // thing that fills it in.
    let mut detail = AlbumDetailViewModel::new(Arc::clone(&graph), identity.clone());
    detail.show_album(&album.id).await?;

    let mut uploader =
        PhotoUploader::new(Arc::clone(&graph), Arc::clone(&store), config.bucket.clone(), identity);
    if cmd.with_labels {
        uploader = uploader.with_labeler(Arc::new(RekognitionLabeler::new(config.region.clone())?));
    }

    let total = requests.len();
    let done = AtomicUsize::new(0);
    let outcomes = uploader
        .upload_all_with(&album.id, requests, |_| {
            let count = done.fetch_add(1, Ordering::Relaxed) + 1;
            let _ = rewrite_message(stdout(), format!("uploaded {} / {} files", count, total));
        })
        .await;
    println!();

    for outcome in outcomes.iter().filter(|outcome| !outcome.succeeded()) {
        println!("failed to upload {} ({:?})", outcome.file_name, outcome.phase);
    }

    // Let the subscription deliver the last created records.
    tokio::time::sleep(Duration::from_millis(100)).await;

    if let Some(album) = detail.album() {
        println!("📚 album '{}' has {} photos:", album.name, album.photos.items.len());
        let rows = render::photo_rows(store.as_ref(), &album.photos.items).await?;
        for row in rows {
            println!("\t{} {}", row.url, row.caption);
        }
    }

    detail.deactivate();
    list.deactivate();
    Ok(())
}
