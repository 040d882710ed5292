//! accessgate application entry point.
//!
//! Bootstraps the server:
//! 1. Load configuration from environment
//! 2. Connect to Redis (session store)
//! 3. Build router with the signed-session gate in front of `/api`
//! 4. Apply tracing, CORS and security headers layers
//! 5. Start Axum server
//!
//! Also supports a `sign` subcommand that prints the signature a client
//! must send for a request.

use accessgate::{
    auth::{middleware::AppState, sign_request, QueryParams, SignatureScheme},
    config::Config,
    middleware::security_headers,
    routes,
    storage::RedisSessionStore,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

fn print_sign_usage() {
    eprintln!("Usage: accessgate sign <path> <query> <token> <timestamp> [md5|hmac-sha256]");
    eprintln!();
    eprintln!("Print the Access-Sign value for a request.");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  accessgate sign /api/session '_=1&page=2' s3cret $(date +%s)");
}

fn sign(args: &[String]) -> Result<String, String> {
    let scheme = match args.get(4) {
        Some(s) => s.parse::<SignatureScheme>()?,
        None => SignatureScheme::default(),
    };
    let query = QueryParams::parse(Some(args[1].as_str()));
    Ok(sign_request(scheme, &args[0], &query, &args[2], &args[3]))
}

#[tokio::main]
async fn main() {
    // Check for sign subcommand
    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 && args[1] == "sign" {
        if args.len() != 6 && args.len() != 7 {
            print_sign_usage();
            std::process::exit(1);
        }
        match sign(&args[2..]) {
            Ok(signature) => println!("{}", signature),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // Initialize tracing with env filter support (RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config from environment
    let config = Config::from_env().expect("Failed to load config");
    tracing::info!(
        access_expire_secs = config.access_expire_secs,
        scheme = %config.signature_scheme,
        "Starting accessgate on {}",
        config.bind_addr
    );
    if config.access_expire_secs == 0 {
        tracing::warn!("ACCESS_EXPIRE is 0; request freshness is not enforced");
    }

    // Connect to Redis
    let redis_client = redis::Client::open(config.redis_url.as_str()).expect("Invalid Redis URL");

    // Verify Redis connection
    redis_client
        .get_multiplexed_async_connection()
        .await
        .expect("Failed to connect to Redis");

    let state = AppState {
        store: RedisSessionStore::new(redis_client, &config.redis_prefix),
        config: Arc::new(config.clone()),
    };

    // Explicit CORS: deny all cross-origin requests (single-origin deployment).
    let cors = CorsLayer::new();

    let app = routes::api_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(security_headers));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind");
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
