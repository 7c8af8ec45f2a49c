use std::path::PathBuf;
use std::sync::Arc;

use cinebox::api::{ApiError, Category, Genre, MovieFilter, MoviePage, query};
use cinebox::config::{AppConfig, ConfigError};
use cinebox::context::AppContext;
use cinebox::router::Navigation;
use cinebox::storage::StorageError;
use cinebox::ui::{Effect, Notice, RecordingEffects};
use clap::{Args, Parser, Subcommand};

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

const BROWSE_PATH: &str = "/browse";
const MY_LIST_PATH: &str = "/my-list";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("catalog request failed: {0}")]
    Api(#[from] ApiError),
    #[error("storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sign in required for {path}; run `cinebox login <email> <api-key>` first")]
    SignInRequired { path: String },
    #[error("no route for {0}")]
    NotFound(String),
    #[error("{0} failed")]
    Rejected(&'static str),
    #[error("movie {id} not found on {category} page {page}")]
    MovieNotFound { id: u64, category: Category, page: u32 },
}

#[derive(Parser, Debug)]
#[command(name = "cinebox", about = "Browse the TMDB movie catalog from the terminal")]
struct Cli {
    /// Storage file.
    #[arg(long, global = true, env = "CINEBOX_STORAGE_PATH")]
    storage: Option<PathBuf>,

    /// Print catalog results as JSON.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register an email with a TMDB API key as its password.
    Register { email: String, password: String },
    Login {
        email: String,
        password: String,
        #[arg(long, default_value_t = false)]
        remember: bool,
    },
    Logout,
    /// Show whether a session is active.
    Status,
    /// Run a navigation through the route guard.
    Open { path: String },
    Movies {
        category: Category,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Genre {
        genre_id: u32,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Discover(DiscoverArgs),
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Genres,
    Favorites(FavoritesCommand),
}

#[derive(Args, Debug)]
struct DiscoverArgs {
    #[arg(long)]
    genre: Option<u32>,
    #[arg(long)]
    min_rating: Option<f64>,
    #[arg(long)]
    year: Option<String>,
    #[arg(long)]
    sort_by: Option<String>,
    #[arg(long, default_value_t = 1)]
    page: u32,
}

#[derive(Args, Debug)]
struct FavoritesCommand {
    #[command(subcommand)]
    command: FavoritesSubcommand,
}

#[derive(Subcommand, Debug)]
enum FavoritesSubcommand {
    List,
    /// Toggle a movie found on a category listing page.
    Toggle {
        movie_id: u64,
        #[arg(long, default_value = "popular")]
        category: Category,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(path) = cli.storage {
        config.storage_path = path;
    }

    let effects = Arc::new(RecordingEffects::new());
    let mut ctx = AppContext::init(config, effects.clone())?;
    let result = run(&mut ctx, cli.command, cli.json).await;
    render_effects(&effects);
    ctx.teardown();
    result
}

async fn run(ctx: &mut AppContext, command: Command, json: bool) -> Result<(), CliError> {
    match command {
        Command::Register { email, password } => {
            if !ctx.session.register(&email, &password).await {
                return Err(CliError::Rejected("registration"));
            }
            Ok(())
        }
        Command::Login { email, password, remember } => {
            if !ctx.session.login(&email, &password, remember) {
                return Err(CliError::Rejected("sign-in"));
            }
            Ok(())
        }
        Command::Logout => {
            ctx.session.logout();
            Ok(())
        }
        Command::Status => {
            let authenticated = ctx.session.check_auth();
            match (authenticated, ctx.session.session().email.as_deref()) {
                (true, Some(email)) => println!("signed in as {email}"),
                (true, None) => println!("signed in"),
                (false, _) => match ctx.session.remembered_email() {
                    Some(email) => println!("signed out (remembered: {email})"),
                    None => println!("signed out"),
                },
            }
            Ok(())
        }
        Command::Open { path } => {
            match ctx.navigate(&path) {
                Navigation::Proceed(route) => println!("{} ({})", route.name, route.path),
                Navigation::Redirect { from, to } => println!("{} -> redirected to {to}", from.path),
                Navigation::NotFound => return Err(CliError::NotFound(path)),
            }
            Ok(())
        }
        Command::Movies { category, page } => {
            require_route(ctx, BROWSE_PATH)?;
            let page = ctx
                .api
                .movies(&query::category(category, page), ctx.session.credential())
                .await?;
            print_page(&page, json)
        }
        Command::Genre { genre_id, page } => {
            require_route(ctx, BROWSE_PATH)?;
            let page = ctx
                .api
                .movies(&query::by_genre(genre_id, page), ctx.session.credential())
                .await?;
            print_page(&page, json)
        }
        Command::Discover(args) => {
            require_route(ctx, BROWSE_PATH)?;
            let filter = MovieFilter {
                genre_id: args.genre,
                min_rating: args.min_rating,
                year: args.year,
                sort_by: args.sort_by,
                page: args.page,
            };
            let page = ctx
                .api
                .movies(&query::by_filters(&filter), ctx.session.credential())
                .await?;
            print_page(&page, json)
        }
        Command::Search { query: text, page } => {
            require_route(ctx, BROWSE_PATH)?;
            let page = ctx
                .api
                .movies(&query::search(&text, page), ctx.session.credential())
                .await?;
            print_page(&page, json)
        }
        Command::Genres => {
            require_route(ctx, BROWSE_PATH)?;
            let genres = ctx.api.genres(ctx.session.credential()).await?;
            print_genres(&genres, json)
        }
        Command::Favorites(favorites) => run_favorites(ctx, favorites, json).await,
    }
}

async fn run_favorites(ctx: &mut AppContext, favorites: FavoritesCommand, json: bool) -> Result<(), CliError> {
    require_route(ctx, MY_LIST_PATH)?;
    let mut set = ctx.favorites();
    match favorites.command {
        FavoritesSubcommand::List => {
            if json {
                println!("{}", serde_json::to_string_pretty(set.movies())?);
            } else if set.movies().is_empty() {
                println!("no favorites yet");
            } else {
                for movie in set.movies() {
                    println!("{:>8}  {} ({})", movie.id, movie.title, movie.release_date);
                }
            }
            Ok(())
        }
        FavoritesSubcommand::Toggle { movie_id, category, page } => {
            let listing = ctx
                .api
                .movies(&query::category(category, page), ctx.session.credential())
                .await?;
            let movie = listing
                .results
                .iter()
                .find(|m| m.id == movie_id)
                .ok_or(CliError::MovieNotFound { id: movie_id, category, page })?;
            if set.toggle(movie)? {
                println!("added {} to favorites", movie.title);
            } else {
                println!("removed {} from favorites", movie.title);
            }
            Ok(())
        }
    }
}

fn require_route(ctx: &mut AppContext, path: &str) -> Result<(), CliError> {
    match ctx.navigate(path) {
        Navigation::Proceed(_) => Ok(()),
        Navigation::Redirect { .. } => Err(CliError::SignInRequired { path: path.to_owned() }),
        Navigation::NotFound => Err(CliError::NotFound(path.to_owned())),
    }
}

fn print_page(page: &MoviePage, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(page)?);
        return Ok(());
    }
    for movie in &page.results {
        println!(
            "{:>8}  {:<40}  {:>4.1}  {}",
            movie.id, movie.title, movie.vote_average, movie.release_date
        );
    }
    println!("page {} of {}", page.page, page.total_pages);
    Ok(())
}

fn print_genres(genres: &[Genre], json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(genres)?);
        return Ok(());
    }
    for genre in genres {
        println!("{:>6}  {}", genre.id, genre.name);
    }
    Ok(())
}

fn render_effects(effects: &RecordingEffects) {
    for effect in effects.take() {
        match effect {
            Effect::Notice(Notice::Success(message)) => eprintln!("✔ {message}"),
            Effect::Notice(Notice::Error(message)) => eprintln!("✘ {message}"),
            Effect::Navigate(path) => tracing::debug!(%path, "navigation requested"),
        }
    }
}
