//! One-shot account commands: `parley register` and `parley online`.

use pl_auth::{AuthService, PresenceDirectory, RestAuthClient};
use pl_domain::config::Config;
use pl_domain::identity::validate_identity;

pub async fn register(config: &Config, name: &str) -> anyhow::Result<()> {
    let name = validate_identity(name)?;
    let client = RestAuthClient::new(&config.service)?;
    client.register(name).await?;
    println!("Registered {name}. Log in with `parley chat --user {name}`.");
    Ok(())
}

pub async fn online(config: &Config) -> anyhow::Result<()> {
    let client = RestAuthClient::new(&config.service)?;
    let mut users = client.list_online().await?;
    users.sort();
    if users.is_empty() {
        eprintln!("Nobody is online.");
    }
    for user in users {
        println!("{user}");
    }
    Ok(())
}
