//! Fruitmarket CLI - manage a fruit inventory from the command line

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use fruitmarket::config::{self, FruitmarketConfig};
use fruitmarket::inventory::{self, NewFruit, Picture};
use fruitmarket::provider::QueryArgs;
use fruitmarket::ui::{self, Icons};
use fruitmarket::watcher::DbWatcher;
use fruitmarket::{contract::fruit_entry, ContentUri, ContentValues, Fruit, FruitProvider, ProviderHandle};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "fruitmarket")]
#[command(version = "0.0.1")]
#[command(about = "Fruit inventory store with change notification")]
#[command(long_about = r#"
Fruitmarket keeps a small product catalog in SQLite and lets you:
  • List, add, edit and delete fruits
  • Sell one unit or adjust stock
  • Watch the catalog and refresh whenever it changes
  • Serve the catalog over HTTP

Example usage:
  fruitmarket init
  fruitmarket add --name Tomato --price 5 --quantity 100
  fruitmarket order 1
  fruitmarket watch
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file and create the database
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// List the catalog
    List {
        /// Sort order, e.g. "name" or "price DESC"
        #[arg(short, long)]
        order: Option<String>,
    },

    /// Show one fruit
    Show { id: i64 },

    /// Add a fruit
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        price: f64,

        #[arg(long)]
        quantity: Option<i64>,

        #[arg(long)]
        supplier: Option<String>,

        /// Image file to store with the fruit
        #[arg(long)]
        picture: Option<PathBuf>,
    },

    /// Change fields of a fruit
    Edit {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        price: Option<f64>,

        #[arg(long)]
        quantity: Option<i64>,

        #[arg(long)]
        supplier: Option<String>,

        /// Image file to store with the fruit
        #[arg(long)]
        picture: Option<PathBuf>,
    },

    /// Delete a fruit
    Delete { id: i64 },

    /// Delete every fruit
    Clear,

    /// Sell one unit of a fruit
    Order { id: i64 },

    /// Add (or, with a negative delta, remove) stock
    Stock {
        id: i64,

        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },

    /// Insert the sample fruit
    Seed,

    /// Show inventory statistics
    Stats,

    /// Print the catalog and reprint it whenever it changes
    Watch {
        /// Sort order, e.g. "name" or "price DESC"
        #[arg(short, long)]
        order: Option<String>,
    },

    /// Serve the catalog over HTTP
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = config::load_config(cli.config.as_deref())?.unwrap_or_default();

    // Initialize logging
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = EnvFilter::new(settings.log_directive(cli.verbose, rust_log.as_deref()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cwd = std::env::current_dir()?;
    let database = cli.database.clone().unwrap_or_else(|| settings.database_path(&cwd));

    match cli.command {
        Commands::Init { force } => {
            let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
            let written = FruitmarketConfig {
                database: Some(database.to_string_lossy().to_string()),
                ..settings
            };
            config::write_config(&config_path, &written, force)?;
            open_provider(&database)?;

            ui::success("Initialized fruitmarket");
            ui::info("Config", &config_path.display().to_string());
            ui::info("Database", &database.display().to_string());
        }

        Commands::List { order } => {
            let provider = open_provider(&database)?;
            let fruits = inventory::list(&provider, order.as_deref())?;
            print_catalog(&fruits);
        }

        Commands::Show { id } => {
            let provider = open_provider(&database)?;
            match inventory::fetch(&provider, &ContentUri::fruit(id))? {
                Some(fruit) => println!("{}", ui::fruit_detail_table(&fruit)),
                None => ui::warn(&format!("No fruit with id {}", id)),
            }
        }

        Commands::Add { name, price, quantity, supplier, picture } => {
            let provider = open_provider(&database)?;
            let mut fruit = NewFruit::new(name, price);
            fruit.quantity = quantity;
            fruit.supplier = supplier;
            fruit.picture = picture.as_deref().map(read_picture).transpose()?;

            match inventory::add(&provider, fruit)? {
                Some(uri) => ui::fruit_added(&uri.to_uri_string()),
                None => ui::error("Error with saving fruit"),
            }
        }

        Commands::Edit { id, name, price, quantity, supplier, picture } => {
            let provider = open_provider(&database)?;
            let mut values = ContentValues::new();
            if let Some(name) = name {
                values.put(fruit_entry::NAME, name);
            }
            if let Some(price) = price {
                values.put(fruit_entry::PRICE, price);
            }
            if let Some(quantity) = quantity {
                values.put(fruit_entry::QUANTITY, quantity);
            }
            if let Some(supplier) = supplier {
                values.put(fruit_entry::SUPPLIER, supplier);
            }
            if let Some(path) = picture {
                values.put(fruit_entry::PICTURE, read_picture(&path)?);
            }
            if values.is_empty() {
                ui::warn("Nothing to change");
                return Ok(());
            }

            let uri = ContentUri::fruit(id);
            match provider.update(&uri.to_uri_string(), &values, None, &[])? {
                0 => ui::error("Error with updating fruit"),
                _ => ui::fruit_changed(&uri.to_uri_string()),
            }
        }

        Commands::Delete { id } => {
            let provider = open_provider(&database)?;
            let uri = ContentUri::fruit(id);
            match provider.delete(&uri.to_uri_string(), None, &[])? {
                0 => ui::error("Error with deleting fruit"),
                _ => ui::fruit_removed(&uri.to_uri_string()),
            }
        }

        Commands::Clear => {
            let provider = open_provider(&database)?;
            let deleted = inventory::delete_all(&provider)?;
            ui::fruit_removed(&format!("{} fruit(s)", deleted));
        }

        Commands::Order { id } => {
            let provider = open_provider(&database)?;
            let fruit = inventory::order_one(&provider, &ContentUri::fruit(id))?;
            println!(
                "{} Sold one {}; {} left, {} ordered, total {}",
                Icons::CART,
                fruit.name,
                ui::stock_level(fruit.quantity),
                fruit.quantity_ordered,
                ui::money(fruit.total)
            );
        }

        Commands::Stock { id, delta } => {
            let provider = open_provider(&database)?;
            let quantity = inventory::adjust_stock(&provider, &ContentUri::fruit(id), delta)?;
            println!("{} Stock now {}", Icons::PACKAGE, ui::stock_level(quantity));
        }

        Commands::Seed => {
            let provider = open_provider(&database)?;
            match inventory::insert_sample(&provider)? {
                Some(uri) => ui::fruit_added(&uri.to_uri_string()),
                None => ui::error("Error with saving fruit"),
            }
        }

        Commands::Stats => {
            let provider = open_provider(&database)?;
            let stats = provider.stats()?;
            println!("{} Fruitmarket Statistics ({})", Icons::STATS, database.display());
            println!("{}", ui::stats_table(&stats));
        }

        Commands::Watch { order } => {
            let provider = Arc::new(open_provider(&database)?);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(watch(provider, database, order))?;
        }

        Commands::Serve { port } => {
            config::ensure_db_dir(&database)?;
            let port = port.unwrap_or_else(|| settings.port());
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(fruitmarket::server::start_server(port, database))?;
        }
    }

    Ok(())
}

fn open_provider(database: &Path) -> anyhow::Result<FruitProvider> {
    config::ensure_db_dir(database)?;
    tracing::debug!("Opening {}", database.display());
    Ok(FruitProvider::open(database)?)
}

fn read_picture(path: &Path) -> anyhow::Result<Picture> {
    Ok(Picture::Image(std::fs::read(path)?))
}

fn print_catalog(fruits: &[Fruit]) {
    if fruits.is_empty() {
        println!("{} {}", Icons::APPLE, ui::muted("No fruits in the catalog."));
    } else {
        println!("{}", ui::fruits_table(fruits));
    }
}

/// Reprint the catalog each time its cursor goes stale. Writes from other
/// processes reach the bus through the file watcher.
async fn watch(provider: Arc<FruitProvider>, database: PathBuf, order: Option<String>) -> anyhow::Result<()> {
    let watcher = DbWatcher::new(database.clone(), Arc::clone(&provider));
    std::thread::spawn(move || {
        if let Err(e) = watcher.run() {
            tracing::error!("File watcher stopped: {}", e);
        }
    });

    let handle = ProviderHandle::from_arc(provider);
    ui::header(&format!("Watching {} (Ctrl-C to stop)", database.display()));

    for refresh in 0u64.. {
        let mut args = QueryArgs::new();
        if let Some(order) = &order {
            args = args.sort_order(order.clone());
        }
        let cursor = handle.query(ContentUri::fruits().to_uri_string(), args).await?;
        ui::section(&format!(" catalog #{} ", refresh));
        print_catalog(&Fruit::all_from_cursor(&cursor)?);

        tokio::select! {
            _ = cursor.changed() => {}
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}
