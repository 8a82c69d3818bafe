//! Directory listings: locations from the active provider, accounts from
//! the live API.

use bizdash_core::AppConfig;
use bizdash_gbp::{DataProvider, GbpClient};

/// Print the locations available for selection.
///
/// # Errors
///
/// Returns an error if the data provider cannot be built.
pub(crate) async fn run_locations(config: &AppConfig, brand: Option<&str>) -> anyhow::Result<()> {
    let provider = DataProvider::from_config(config).await?;
    let locations = provider.directory().available(brand);

    if locations.is_empty() {
        println!(
            "no locations found{}",
            brand.map(|b| format!(" for brand '{b}'")).unwrap_or_default()
        );
        return Ok(());
    }

    println!("{:<28}{:<24}NAME", "ID", "BRAND");
    for location in locations {
        println!(
            "{:<28}{:<24}{}",
            location.id,
            location.brand.as_deref().unwrap_or("-"),
            location.name
        );
    }
    Ok(())
}

/// Print every account the access token can see.
///
/// # Errors
///
/// Returns an error if no access token is configured or the API call fails.
pub(crate) async fn run_accounts(config: &AppConfig) -> anyhow::Result<()> {
    let token = config.gbp_access_token.as_deref().ok_or_else(|| {
        anyhow::anyhow!("BIZDASH_GBP_ACCESS_TOKEN is required to list accounts")
    })?;
    let client = GbpClient::new(token, config.gbp_timeout_secs)?;
    let accounts = client.list_accounts().await?;

    if accounts.is_empty() {
        println!("no Business Profile accounts visible to this token");
        return Ok(());
    }

    println!("{:<28}{:<20}NAME", "ACCOUNT", "TYPE");
    for account in &accounts {
        println!(
            "{:<28}{:<20}{}",
            account.name,
            account.account_type.as_deref().unwrap_or("-"),
            account.account_name.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
