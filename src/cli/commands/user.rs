use anyhow::Context;
use clap::Args;
use serde_json::{json, Value};

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::models::NewUser;
use crate::database::DatabaseManager;
use crate::gateway::Store;
use crate::schemas::definitions::USER_NEW;

#[derive(Args, Debug)]
pub struct CreateUserArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub password: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, help = "Grant admin rights")]
    pub admin: bool,
}

impl CreateUserArgs {
    fn to_body(&self) -> Value {
        json!({
            "username": self.username,
            "password": self.password,
            "firstName": self.first_name,
            "lastName": self.last_name,
            "email": self.email,
            "isAdmin": self.admin,
        })
    }
}

pub async fn handle(args: CreateUserArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let fields = match USER_NEW.validate(&args.to_body()) {
        Ok(fields) => fields,
        Err(errors) => {
            output_error(output_format, &errors.to_string(), Some("VALIDATION_ERROR"))?;
            anyhow::bail!("invalid user");
        }
    };
    let new_user: NewUser = serde_json::from_value(Value::Object(fields))?;

    let config = config::config();
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("connecting to database")?;
    let store = Store::postgres(pool, config.security.bcrypt_cost);

    let user = store
        .users
        .register(new_user)
        .await
        .context("registering user")?;

    output_success(
        output_format,
        &format!("Created user {} (admin: {})", user.username, user.is_admin),
        Some(json!({ "user": user })),
    )
}
