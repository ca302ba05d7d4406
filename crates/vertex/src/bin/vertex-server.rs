//! Vertex demo server - Entry point
//!
//! Serves a small `users` API built from the framework's pieces, configured
//! from an optional file plus `VERTEX__*` environment variables.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing::info;

use vertex::middleware::stages::BasicAuth;
use vertex::prelude::*;

/// Command-line arguments.
struct Args {
    /// Path to configuration file.
    config: Option<PathBuf>,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = args.next().map(PathBuf::from);
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("vertex-server {}", vertex::VERSION);
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
        }

        Self { config }
    }
}

fn print_help() {
    println!(
        r"Vertex demo server

USAGE:
    vertex-server [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
    -h, --help             Print help information
    -v, --version          Print version information

ENVIRONMENT VARIABLES:
    VERTEX__SERVER__LISTEN                Listen address (default: :9944)
    VERTEX__SERVER__ALLOW_INSECURE        Serve plain HTTP to remote clients
    VERTEX__SERVER__LOGGING_LEVEL         DEBUG, INFO, WARN, ERROR or CRITICAL
    VERTEX__SERVER__CLIENT_TIMEOUT_SECS   Request read timeout (default: 60)
    VERTEX__SERVER__CONSOLE_FILES_PATH    Console UI directory, empty to disable
    VERTEX__AUTH__USER                    Basic auth user for /user/private
    VERTEX__AUTH__PASSWORD                Basic auth password for /user/private
    VERTEX__APIS__USERS__STATIC_DIR       Directory served under /static
"
    );
}

/// The `[apis.users]` config section.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct UsersConfig {
    static_dir: PathBuf,
    greeting: String,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("/tmp"),
            greeting: "Hello".to_string(),
        }
    }
}

/// A pair of values sent as `foo,bar`.
#[derive(Debug, Default, Clone, Serialize)]
struct Banana {
    foo: String,
    bar: String,
}

impl Unmarshaler for Banana {
    fn unmarshal_request_data(data: &str) -> Result<Self, BindError> {
        match data.split_once(',') {
            Some((foo, bar)) => Ok(Self {
                foo: foo.to_string(),
                bar: bar.to_string(),
            }),
            None => Err(BindError::decode(data, "expected foo,bar")),
        }
    }
}

#[derive(Debug, Serialize)]
struct User {
    id: String,
    name: String,
    banana: Banana,
    greeting: String,
}

#[derive(Debug, Default)]
struct UserHandler {
    id: String,
    name: String,
    banana: Option<Banana>,
}

impl Bindable for UserHandler {
    fn field(&self, key: &str) -> Option<FieldRef<'_>> {
        match key {
            "Id" => Some(FieldRef::from(&self.id)),
            "Name" => Some(FieldRef::from(&self.name)),
            "Banana" => self.banana.as_ref().map(|_| FieldRef::Opaque),
            _ => None,
        }
    }

    fn set_field(&mut self, key: &str, value: Value) -> Result<(), BindError> {
        match key {
            "Id" => self.id = value.into_string()?,
            "Name" => self.name = value.into_string()?,
            "Banana" => self.banana = Some(value.decode()?),
            _ => return Err(BindError::UnknownField(key.to_string())),
        }
        Ok(())
    }
}

impl DescribeInput for UserHandler {
    fn input_shape() -> InputShape {
        InputShape::fields([
            FieldDecl::ignored("Get user info"),
            FieldDecl::string("Id").tags(
                r#"schema:"id" maxlen:"100" pattern:"[a-zA-Z]+" required:"true" doc:"The id of the user" in:"path""#,
            ),
            FieldDecl::string("Name").tags(
                r#"schema:"name" maxlen:"100" minlen:"1" required:"true" doc:"The name of the user""#,
            ),
            FieldDecl::decoded("Banana").tags(r#"schema:"banana" required:"true""#),
        ])
    }
}

impl RequestHandler for UserHandler {
    fn handle<'a>(
        &'a self,
        _w: &'a mut ResponseWriter,
        req: &'a RequestContext,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let greeting = req
                .attribute::<String>("greeting")
                .cloned()
                .unwrap_or_default();
            Reply::json(&User {
                id: self.id.clone(),
                name: self.name.clone(),
                banana: self.banana.clone().unwrap_or_default(),
                greeting,
            })
        })
    }
}

fn users_api(config: &VertexConfig) -> anyhow::Result<Api> {
    let users: UsersConfig = config.api_config("users")?.unwrap_or_default();
    let greeting = users.greeting.clone();
    let root = "/users/1.0";

    Ok(Api::new("users", "1.0")
        .title("Users API")
        .doc("Look up users by id")
        .allow_insecure(config.server.allow_insecure)
        .middleware(default_middleware())
        .with_middleware(Arc::new(middleware_fn("greeting", move |w, req, next| {
            req.set_attribute("greeting", greeting.clone());
            next.run(w, req)
        })))
        .route(
            Route::handler::<UserHandler>("/user/byId/{id}", MethodFlag::GET)
                .description("Get user info by id")
                .returns("User"),
        )
        .route(
            Route::handler::<UserHandler>("/user/private/{id}", MethodFlag::GET | MethodFlag::POST)
                .description("Get user info behind basic auth")
                .returns("User")
                .with_middleware(Arc::new(BasicAuth::new(
                    config.auth.user.clone(),
                    config.auth.password.clone(),
                    "vertex",
                ))),
        )
        .route(StaticHandler::new(format!("{root}/static"), users.static_dir).route("/static/*filepath")))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new().with_dotenv()?;
    if let Some(path) = &args.config {
        loader = loader.with_file(path)?;
    }
    let config = loader
        .with_env_prefix("VERTEX")
        .load()
        .context("loading configuration")?;

    init_logging(&config.log_config()?)?;
    info!(config = ?args.config, "configuration loaded");

    let registry = vertex::registry(&config)
        .api(users_api(&config)?)
        .freeze()
        .context("registering apis")?;

    vertex::serve(&config, registry).await?;
    Ok(())
}
