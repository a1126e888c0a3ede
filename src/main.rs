use std::path::{Path, PathBuf};

use actix_web::{middleware, web, App, HttpServer};
use clap::{Parser, Subcommand};

use smartdine::config::Config;
use smartdine::db::{self, DbError, DbPool};
use smartdine::seed::{self, ImportOutcome, SeedData};
use smartdine::{routes, session_middleware};

#[derive(Parser)]
#[command(version, about = "Mood-based food recommendations")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Migrate, seed an empty database, then start the HTTP server (default).
    Serve,
    /// Import moods and foods from a JSON document into an empty database.
    Seed {
        /// Seed document; defaults to SEED_FILE.
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn prepare_database(config: &Config) -> Result<DbPool, DbError> {
    let pool = db::init_pool(&config.database_url, config.pool_size)?;
    let mut conn = pool.get()?;
    db::run_migrations(&mut conn)?;
    Ok(pool)
}

fn seed_from(path: &Path, pool: &DbPool) -> Result<ImportOutcome, DbError> {
    let data = SeedData::load(path)?;
    let mut conn = pool.get()?;
    Ok(seed::import(&data, &mut conn)?)
}

#[actix_web::main]
async fn main() -> Result<(), DbError> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let cli = Cli::parse();
    let config = Config::from_env()?;
    let pool = prepare_database(&config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Seed { file } => {
            let path = file.unwrap_or_else(|| config.seed_file.clone());
            let outcome = seed_from(&path, &pool)?;
            log::info!("seed {}: {outcome:?}", path.display());
            Ok(())
        }
        Command::Serve => {
            if config.seed_file.exists() {
                seed_from(&config.seed_file, &pool)?;
            } else {
                log::warn!(
                    "seed file {} not found, skipping import",
                    config.seed_file.display()
                );
            }

            let key = config.session_key();
            let secure = config.cookie_secure;
            log::info!("starting HTTP server at http://{}", config.bind_address);

            HttpServer::new(move || {
                App::new()
                    .app_data(web::Data::new(pool.clone()))
                    .wrap(session_middleware(key.clone(), secure))
                    .wrap(middleware::Logger::default())
                    .configure(routes::configure)
            })
            .bind(config.bind_address.as_str())?
            .run()
            .await?;
            Ok(())
        }
    }
}
