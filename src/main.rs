use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use wysiwyg_resize::cleanup::{DeleteContext, PlainIdCodec};
use wysiwyg_resize::config;
use wysiwyg_resize::events::ResizeObserver;
use wysiwyg_resize::{output, process};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "wysiwyg-resize")]
#[command(about = "Resized copies for a wysiwyg image library")]
#[command(long_about = "\
Resized copies for a wysiwyg image library

Every uploaded image gets one resized copy per configured size, written
next to it as <name>-<key>.<ext>. Images already inside a size's box are
left alone. Deleting an original removes its copies, but only inside the
current directory and the storage root.

  media/wysiwyg/
  ├── photo.jpg           # 1000x1000 upload
  ├── photo-small.jpg     # small = \"50x50\"
  └── photo-large.jpg     # large = \"800x600\"

Payloads are the host's own: the upload response body
({\"error\":false,\"path\":\"...\",\"file\":\"...\"}) and the JSON `files`
parameter of a delete request.

Logging goes to stderr and follows RUST_LOG.

Run 'wysiwyg-resize gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create resized copies for an upload response body
    Upload {
        /// JSON upload response, e.g. {"error":false,"path":"media","file":"a.jpg"}
        response: String,
    },
    /// Remove resized copies of deleted originals
    Delete {
        /// JSON array of file identifiers
        files: String,
        /// Directory the originals were deleted from
        #[arg(long)]
        current_path: PathBuf,
        /// Storage root (defaults to storage.root from the config)
        #[arg(long)]
        storage_root: Option<PathBuf>,
        /// Identifiers are plain filenames, not host-encoded
        #[arg(long)]
        plain_ids: bool,
    },
    /// Create resized copies of one image
    Resize {
        /// Original image
        source: PathBuf,
    },
    /// List the configured sizes
    Sizes,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "wysiwyg_resize=info".into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let load = || config::load_config(&cli.config);

    match cli.command {
        Command::Upload { response } => {
            match ResizeObserver::new(load()?).handle_upload_response(&response)? {
                Some(report) => output::print_generate_output(&report),
                None => println!("Upload reported an error, nothing to resize"),
            }
        }
        Command::Delete {
            files,
            current_path,
            storage_root,
            plain_ids,
        } => {
            let config = load()?;
            let ctx = DeleteContext {
                storage_root: storage_root.unwrap_or_else(|| config.storage_root()),
                current_path,
            };
            let report = if plain_ids {
                ResizeObserver::new(config)
                    .with_codec(PlainIdCodec)
                    .handle_delete_request(&files, &ctx)?
            } else {
                ResizeObserver::new(config).handle_delete_request(&files, &ctx)?
            };
            output::print_cleanup_output(&report);
        }
        Command::Resize { source } => {
            let config = load()?;
            let report =
                process::generate(&source, &config.size_specs()?, &config.generate_options());
            output::print_generate_output(&report);
        }
        Command::Sizes => {
            output::print_sizes_output(&load()?.size_specs()?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
