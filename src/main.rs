// ABOUTME: Entry point for the eventbook binary.
// ABOUTME: Parses CLI arguments, initializes tracing, opens the configured store, and runs one command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use eventbook_core::{
    Booking, DocumentFormat, Event, EventDraft, FilterSpec, SeatRestoration, SortKey,
    export_file_name, parse_document,
};
use eventbook_store::{Backend, BookingDesk, EventbookConfig, KeyValueStore};

#[derive(Debug, Parser)]
#[command(name = "eventbook", version, about = "Browse events, book seats, manage the catalog")]
struct Cli {
    /// Data directory (overrides EVENTBOOK_HOME).
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Storage backend: json or sqlite (overrides EVENTBOOK_BACKEND).
    #[arg(long, global = true)]
    backend: Option<Backend>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List events, optionally filtered, searched and sorted.
    Events {
        #[arg(long, default_value = "all")]
        category: String,
        /// date_asc, date_desc, price_asc or price_desc.
        #[arg(long, default_value = "date_asc")]
        sort: String,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Show one event in full.
    Show { event_id: String },
    /// List the category filter options.
    Categories,
    /// Create an event.
    Add(EventArgs),
    /// Replace every attribute of an event.
    Edit {
        event_id: String,
        #[command(flatten)]
        fields: EventArgs,
    },
    /// Delete an event. Its bookings are kept.
    Delete { event_id: String },
    /// Book tickets for an event.
    Book {
        event_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        tickets: u32,
    },
    /// List bookings, newest first.
    Bookings,
    /// Cancel a booking and return its seats.
    Cancel { booking_id: String },
    /// Write all events and bookings to a document.
    Export {
        #[arg(long, default_value = "json")]
        format: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace state from an exported document (.json, .yaml or .yml).
    Import { path: PathBuf },
    /// Load the demo events if the catalog is empty.
    Seed,
}

#[derive(Debug, Args)]
struct EventArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    category: String,
    /// YYYY-MM-DD
    #[arg(long)]
    date: String,
    #[arg(long, allow_hyphen_values = true)]
    price: i64,
    #[arg(long, allow_hyphen_values = true)]
    seats: i64,
    #[arg(long)]
    description: Option<String>,
}

impl From<EventArgs> for EventDraft {
    fn from(args: EventArgs) -> Self {
        Self {
            name: args.name,
            category: args.category,
            date: args.date,
            price: args.price,
            available_seats: args.seats,
            description: args.description,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("eventbook=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = EventbookConfig::from_env()?;
    if let Some(home) = cli.home {
        config.home = home;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    tracing::debug!(?config, "eventbook starting up");

    let store = config
        .open_store()
        .with_context(|| format!("opening store under {}", config.home.display()))?;
    let mut desk = BookingDesk::open(store, config.seed)?;

    run(&mut desk, cli.command)
}

fn run<S: KeyValueStore>(desk: &mut BookingDesk<S>, command: Command) -> Result<()> {
    match command {
        Command::Events {
            category,
            sort,
            search,
        } => {
            let filter = FilterSpec {
                category,
                sort: SortKey::parse(&sort),
                search,
            };
            let events = desk.events(&filter);
            if events.is_empty() {
                println!("No events found.");
            }
            for event in events {
                println!("{}", event_line(event));
            }
        }
        Command::Show { event_id } => {
            let event = desk
                .event(&event_id)
                .with_context(|| format!("event not found: {}", event_id))?;
            print_event(event);
        }
        Command::Categories => {
            for category in desk.categories() {
                println!("{}", category);
            }
        }
        Command::Add(fields) => {
            let event = desk.create_event(fields.into())?;
            println!("Created event {}", event.id);
            print_event(&event);
        }
        Command::Edit { event_id, fields } => {
            let event = desk.update_event(&event_id, fields.into())?;
            println!("Updated event {}", event.id);
            print_event(&event);
        }
        Command::Delete { event_id } => {
            let event = desk.delete_event(&event_id)?;
            println!("Deleted event {} ({})", event.id, event.name);
        }
        Command::Book {
            event_id,
            name,
            tickets,
        } => {
            let booking = desk.book(&event_id, &name, tickets)?;
            println!("Booked {}", booking_line(&booking));
        }
        Command::Bookings => {
            let bookings = desk.bookings();
            if bookings.is_empty() {
                println!("No bookings yet.");
            }
            for booking in bookings {
                println!("{}", booking_line(booking));
            }
        }
        Command::Cancel { booking_id } => {
            let cancellation = desk.cancel(&booking_id)?;
            match cancellation.restoration {
                SeatRestoration::Restored { available_seats } => println!(
                    "Cancelled {}; {} now has {} seats available",
                    cancellation.booking.id, cancellation.booking.event_name, available_seats
                ),
                SeatRestoration::EventGone => println!(
                    "Cancelled {}; event {} no longer exists, no seats restored",
                    cancellation.booking.id, cancellation.booking.event_id
                ),
            }
        }
        Command::Export { format, out } => {
            let format = match format.to_ascii_lowercase().as_str() {
                "json" => DocumentFormat::Json,
                "yaml" | "yml" => DocumentFormat::Yaml,
                other => bail!("unknown export format '{}', expected json or yaml", other),
            };
            let document = desk.export_document(format)?;
            let path = out.unwrap_or_else(|| {
                PathBuf::from(export_file_name(chrono::Local::now().date_naive(), format))
            });
            std::fs::write(&path, document)
                .with_context(|| format!("writing export to {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        Command::Import { path } => {
            let raw = read_document(&path)?;
            let summary = desk.import(&raw)?;
            match summary.bookings {
                Some(bookings) => println!(
                    "Imported {} events and {} bookings",
                    summary.events, bookings
                ),
                None => println!(
                    "Imported {} events; existing bookings kept",
                    summary.events
                ),
            }
        }
        Command::Seed => {
            if desk.ensure_seeded()? {
                println!("Loaded {} demo events", desk.catalog().len());
            } else {
                println!("Catalog already has events; nothing seeded");
            }
        }
    }
    Ok(())
}

fn read_document(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(DocumentFormat::from_extension)
        .unwrap_or_default();
    Ok(parse_document(&text, format)?)
}

fn event_line(event: &Event) -> String {
    let seats = if event.is_sold_out() {
        "sold out".to_string()
    } else {
        format!("{} seats", event.available_seats)
    };
    format!(
        "{}  {}  {:<24} [{}]  ₹{}  {}",
        event.id, event.date, event.name, event.category, event.price, seats
    )
}

fn print_event(event: &Event) {
    println!("{}", event_line(event));
    if !event.description_text().is_empty() {
        println!("    {}", event.description_text());
    }
}

fn booking_line(booking: &Booking) -> String {
    format!(
        "{}  {} x{} for {} on {} (₹{})  {}",
        booking.id,
        booking.event_name,
        booking.tickets,
        booking.customer_name,
        booking.event_date,
        booking.total(),
        booking.created_at.to_rfc3339()
    )
}
