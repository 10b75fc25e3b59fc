//! Apotheca CLI — storefront wishlist, comparison and content from the terminal

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use apotheca::data::{ComparisonStore, FileStorage, Product, WishlistStore};
use apotheca_app::cache::MemoryQueryCache;
use apotheca_app::config::RemoteConfig;
use apotheca_app::notify::LogNotifier;
use apotheca_app::records::{NewCmsPage, PrescriptionStatus, PublishStatus};
use apotheca_app::remote::PostgrestSource;
use apotheca_app::services::Services;
use apotheca_app::Result;

#[derive(Parser)]
#[command(name = "apotheca", about = "Pharmacy storefront client", version)]
struct Cli {
    /// Directory for wishlist and comparison data
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage the wishlist
    #[command(subcommand)]
    Wishlist(WishlistCmd),
    /// Manage the comparison list
    #[command(subcommand)]
    Compare(CompareCmd),
    /// Uploaded prescriptions
    #[command(subcommand)]
    Prescriptions(PrescriptionsCmd),
    /// CMS pages
    #[command(subcommand)]
    Pages(PagesCmd),
    /// Blog posts
    #[command(subcommand)]
    Posts(PostsCmd),
}

#[derive(Subcommand)]
enum WishlistCmd {
    List,
    Add { id: String },
    Remove { id: String },
    Toggle { id: String },
    Clear,
}

#[derive(Subcommand)]
enum CompareCmd {
    List,
    /// Add a product given as a JSON object with at least an "id"
    Add { product: String },
    Remove { id: String },
    Clear,
}

#[derive(Subcommand)]
enum PrescriptionsCmd {
    List,
    Stats,
    /// Change the review status (pending, approved, rejected, completed)
    SetStatus {
        id: String,
        #[arg(value_parser = parse_status)]
        status: PrescriptionStatus,
    },
}

fn parse_status(value: &str) -> std::result::Result<PrescriptionStatus, String> {
    value.parse()
}

#[derive(Subcommand)]
enum PagesCmd {
    List,
    Show {
        slug: String,
    },
    Create {
        #[arg(long)]
        slug: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        /// Publish immediately instead of saving a draft
        #[arg(long)]
        publish: bool,
    },
}

#[derive(Subcommand)]
enum PostsCmd {
    List,
    Show { slug: String },
}

fn main() {
    let cli = Cli::parse();
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Wishlist(cmd) => wishlist(storage(cli.data_dir)?, cmd),
        Command::Compare(cmd) => compare(storage(cli.data_dir)?, cmd),
        Command::Prescriptions(cmd) => prescriptions(&services()?, cmd),
        Command::Pages(cmd) => pages(&services()?, cmd),
        Command::Posts(cmd) => posts(&services()?, cmd),
    }
}

fn storage(dir: Option<PathBuf>) -> Result<FileStorage> {
    let storage = match dir {
        Some(dir) => FileStorage::with_dir(dir),
        None => FileStorage::new()?,
    };
    debug!(dir = ?storage.dir(), "using local storage");
    Ok(storage)
}

fn services() -> Result<Services> {
    let source = PostgrestSource::new(RemoteConfig::from_env()?)?;
    Ok(Services::new(
        Arc::new(source),
        Arc::new(MemoryQueryCache::new()),
    ))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(apotheca::Error::from)?;
    println!("{text}");
    Ok(())
}

fn wishlist(storage: FileStorage, cmd: WishlistCmd) -> Result<()> {
    let mut store = WishlistStore::initialize(storage);
    match cmd {
        WishlistCmd::List => {
            let mut ids = store.list();
            ids.sort();
            for id in ids {
                println!("{id}");
            }
        }
        WishlistCmd::Add { id } => store.add(id),
        WishlistCmd::Remove { id } => store.remove(&id),
        WishlistCmd::Toggle { id } => {
            let present = store.toggle(&id);
            println!("{id}: {}", if present { "added" } else { "removed" });
        }
        WishlistCmd::Clear => store.clear(),
    }
    Ok(())
}

fn compare(storage: FileStorage, cmd: CompareCmd) -> Result<()> {
    let mut store = ComparisonStore::initialize(storage);
    match cmd {
        CompareCmd::List => print_json(&store.items())?,
        CompareCmd::Add { product } => {
            let product: Product =
                serde_json::from_str(&product).map_err(apotheca::Error::from)?;
            let id = product.id.clone();
            if !store.add(product) {
                let reason = if store.contains(&id) {
                    "already in the comparison list"
                } else {
                    "comparison list is full"
                };
                println!("{id}: not added ({reason}, {}/{})", store.count(), store.capacity());
            }
        }
        CompareCmd::Remove { id } => store.remove(&id),
        CompareCmd::Clear => store.clear(),
    }
    Ok(())
}

fn prescriptions(services: &Services, cmd: PrescriptionsCmd) -> Result<()> {
    match cmd {
        PrescriptionsCmd::List => print_json(&services.prescriptions.list()?),
        PrescriptionsCmd::Stats => print_json(&services.prescriptions.stats()?),
        PrescriptionsCmd::SetStatus { id, status } => {
            let updated = services
                .prescriptions
                .update_status(&id, status, Some(&LogNotifier))?;
            print_json(&updated)
        }
    }
}

fn pages(services: &Services, cmd: PagesCmd) -> Result<()> {
    match cmd {
        PagesCmd::List => print_json(&services.pages.list()?),
        PagesCmd::Show { slug } => print_json(&services.pages.published(&slug)?),
        PagesCmd::Create {
            slug,
            title,
            content,
            publish,
        } => {
            let status = if publish {
                PublishStatus::Published
            } else {
                PublishStatus::Draft
            };
            let page = NewCmsPage::new(slug, title, content).with_status(status);
            print_json(&services.pages.create(&page, Some(&LogNotifier))?)
        }
    }
}

fn posts(services: &Services, cmd: PostsCmd) -> Result<()> {
    match cmd {
        PostsCmd::List => print_json(&services.posts.published_list()?),
        PostsCmd::Show { slug } => print_json(&services.posts.published(&slug)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_set_status_parses_known_status() {
        let cli = Cli::try_parse_from(["apotheca", "prescriptions", "set-status", "abc", "approved"])
            .unwrap();
        match cli.command {
            Command::Prescriptions(PrescriptionsCmd::SetStatus { id, status }) => {
                assert_eq!(id, "abc");
                assert_eq!(status, PrescriptionStatus::Approved);
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn test_set_status_rejects_unknown_status_as_argument_error() {
        let err = Cli::try_parse_from(["apotheca", "prescriptions", "set-status", "abc", "shipped"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(err.to_string().contains("unknown prescription status"));
    }
}
