use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use stockpilot_core::{MediaEdit, MediaUrl, ProductId};
use stockpilot_media::{MediaClient, ProgressCallback, UploadProgress};
use tracing::info;

use super::open_inventory;
use crate::cli::args::{GlobalArgs, MediaSub, OffloadArgs, OutputFormat, UploadArgs};
use crate::cli::output::{self, emit};
use crate::exit_codes::EXIT_SUCCESS;

pub async fn run(cmd: MediaSub, global: &GlobalArgs) -> anyhow::Result<i32> {
    let client = MediaClient::from_env()?;
    match cmd {
        MediaSub::Credentials(args) => {
            let creds = client.upload_credentials(&args.file_name).await?;
            emit(global.format, &creds, output::credentials)?;
            Ok(EXIT_SUCCESS)
        }
        MediaSub::Upload(args) => upload(&client, args, global).await,
        MediaSub::Offload(args) => offload(&client, args, global).await,
    }
}

/// Content type from the file extension.
pub(crate) fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template("{spinner} {bytes}/{total_bytes} [{bar:30}] {percent}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb
}

async fn upload(client: &MediaClient, args: UploadArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let data = tokio::fs::read(&args.path)
        .await
        .with_context(|| format!("failed to read {}", args.path.display()))?;
    let file_name = args
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("{} has no usable file name", args.path.display()))?;
    let content_type = args
        .content_type
        .clone()
        .unwrap_or_else(|| guess_content_type(&args.path).to_string());

    // Validate the target before spending time on the upload.
    let target = args
        .attach
        .as_deref()
        .map(ProductId::parse)
        .transpose()?;
    let inventory = match &target {
        Some(id) => {
            let inventory = open_inventory(global)?;
            inventory.get(id)?;
            Some(inventory)
        }
        None => None,
    };

    let bar = (!args.quiet && global.format == OutputFormat::Text)
        .then(|| progress_bar(data.len() as u64));
    let progress = bar.clone().map(|pb| {
        Arc::new(move |p: UploadProgress| pb.set_position(p.sent)) as ProgressCallback
    });

    let uploaded = client
        .upload_bytes(file_name, &data, &content_type, progress)
        .await;
    if let Some(pb) = &bar {
        pb.finish_and_clear();
    }
    let uploaded = uploaded?;

    if let (Some(id), Some(inventory)) = (target, inventory) {
        let url = MediaUrl::parse(&uploaded.public_url)?;
        inventory.edit_media(&id, &MediaEdit::Append(vec![url]))?;
        info!(product_id = %id, url = %uploaded.public_url, "media attached");
    }

    emit(global.format, &uploaded, output::uploaded)?;
    Ok(EXIT_SUCCESS)
}

async fn offload(client: &MediaClient, args: OffloadArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let id = ProductId::parse(&args.id)?;
    let inventory = open_inventory(global)?;
    let product = inventory.get(&id)?;

    let mut inline: Vec<&MediaUrl> = Vec::new();
    for m in product.media_urls.iter().filter(|m| m.is_inline()) {
        if !inline.contains(&m) {
            inline.push(m);
        }
    }
    if inline.is_empty() {
        emit(global.format, &product, |_| format!("{id} has no inline media"))?;
        return Ok(EXIT_SUCCESS);
    }

    let mut replacements = Vec::with_capacity(inline.len());
    for m in inline {
        let remote = client.offload_inline(m).await?;
        replacements.push((m.clone(), remote));
    }
    let offloaded = replacements.len();
    let updated = inventory.edit_media(&id, &MediaEdit::Replace(replacements))?;
    info!(product_id = %id, offloaded, "inline media moved to object storage");
    emit(global.format, &updated, output::product_detail)?;
    Ok(EXIT_SUCCESS)
}
