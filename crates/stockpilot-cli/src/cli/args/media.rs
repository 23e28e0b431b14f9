use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct MediaArgs {
    #[command(subcommand)]
    pub cmd: MediaSub,
}

#[derive(Subcommand, Debug)]
pub enum MediaSub {
    /// Issue direct-upload credentials for a file name
    Credentials(CredentialsArgs),
    /// Upload a local file and print its public URL
    Upload(UploadArgs),
    /// Move a product's inline (data:) media to object storage
    Offload(OffloadArgs),
}

#[derive(Args, Debug)]
pub struct CredentialsArgs {
    pub file_name: String,
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    pub path: PathBuf,

    /// Defaults to a guess from the file extension
    #[arg(long)]
    pub content_type: Option<String>,

    /// Append the uploaded URL to this product's media
    #[arg(long)]
    pub attach: Option<String>,

    /// No progress bar
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct OffloadArgs {
    /// Product id
    pub id: String,
}
