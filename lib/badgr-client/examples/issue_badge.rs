#![allow(missing_docs)]
use anyhow::{Context, Result};
use tracing::{info, warn};

use badgr_client::{ApiClient, Issuer, NewAssertion, NewBadgeClass};

/// Issues a badge to a recipient, creating the badge class when it does not exist yet.
///
/// ```sh
/// cargo run --example issue_badge -- \
///     --base-url http://localhost:8000 --username jane@example.org --password s3cret \
///     --issuer MEbkVM2SSqGwbA7mWV1r2w --badge "Speak Up!" --image speak-up.png \
///     --recipient bob@example.org
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().pretty().init();

    let args = AppArgs::parse().context("parsing arguments")?;

    let client = ApiClient::builder()
        .with_base_url(&args.base_url)
        .with_password_grant(&args.username, args.password.as_str())
        .with_unique_badge_names(true)
        .connect()
        .await
        .context("connecting to Badgr")?;

    let issuer = Issuer::with_eid(&client, &args.issuer);
    client.load_badge_names(&args.issuer).await?;

    if client.names().contains(&args.badge, &args.issuer).await {
        info!(badge = %args.badge, "badge class already exists");
    } else {
        let image = args
            .image
            .as_deref()
            .context("--image is required to create the badge class")?;
        let image = client.encode_image(image)?;
        let badge_class = issuer
            .create_badgeclass(
                &NewBadgeClass::new(&args.badge, image, format!("Awarded by {}", args.issuer))
                    .with_criteria_text(format!("Earn the {} badge", args.badge)),
            )
            .await
            .context("creating badge class")?;
        info!(entity_id = ?badge_class.entity_id(), "badge class created");
    }

    let mut assertion = badgr_client::Assertion::new(&client);
    assertion
        .create(&NewAssertion::new(&args.recipient).with_badge_name(&args.badge, &args.issuer))
        .await
        .context("issuing badge")?;
    info!(entity_id = ?assertion.entity_id(), recipient = %args.recipient, "badge issued");

    Ok(())
}

#[derive(Debug)]
struct AppArgs {
    base_url: String,
    username: String,
    password: String,
    issuer: String,
    badge: String,
    image: Option<String>,
    recipient: String,
}

impl AppArgs {
    fn parse() -> Result<Self> {
        let mut pargs = pico_args::Arguments::from_env();

        let base_url = pargs
            .opt_value_from_str("--base-url")
            .context("parsing base URL argument")?;

        let result = Self {
            base_url: base_url.unwrap_or_else(|| "http://localhost:8000".to_string()),
            username: pargs.value_from_str(["-u", "--username"])?,
            password: pargs.value_from_str(["-p", "--password"])?,
            issuer: pargs.value_from_str(["-i", "--issuer"])?,
            badge: pargs.value_from_str(["-b", "--badge"])?,
            image: pargs.opt_value_from_str("--image")?,
            recipient: pargs.value_from_str(["-r", "--recipient"])?,
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            warn!(?remaining, "Warning: unused arguments left");
        }
        Ok(result)
    }
}
