//! Command execution
//!
//! Each command returns a JSON value that `main` prints to stdout.

use api::{Api, DonationIntent};
use common::Secret;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use crate::cli::Command;
use crate::error::Error;

type Result<T> = std::result::Result<T, Error>;

pub async fn run(api: &Api, command: Command) -> anyhow::Result<Value> {
    let value = match command {
        Command::Login { email, password } => {
            let password = Secret::new(password);
            let profile = api.auth().sign_in(&email, &password).await.map_err(Error::from)?;
            to_json(&profile)?
        }
        Command::Logout => {
            api.auth().sign_out().await.map_err(Error::from)?;
            json!({ "signed_out": true })
        }
        Command::Whoami => {
            require_session(api).await?;
            to_json(&api.auth().profile().await.map_err(Error::from)?)?
        }
        Command::Campaigns => to_json(&api.campaigns().list().await.map_err(Error::from)?)?,
        Command::Events => {
            require_session(api).await?;
            to_json(&api.events().list().await.map_err(Error::from)?)?
        }
        Command::Tasks { mine } => {
            require_session(api).await?;
            let tasks = if mine {
                api.tasks().list_mine().await
            } else {
                api.tasks().list().await
            };
            to_json(&tasks.map_err(Error::from)?)?
        }
        Command::Notifications { mark_all_read } => {
            require_session(api).await?;
            if mark_all_read {
                api.notifications()
                    .mark_all_read()
                    .await
                    .map_err(Error::from)?;
                info!("all notifications marked read");
            }
            to_json(&api.notifications().list().await.map_err(Error::from)?)?
        }
        Command::Volunteers { status } => {
            require_session(api).await?;
            to_json(&api.volunteers().admin_list(status).await.map_err(Error::from)?)?
        }
        Command::Dashboard => {
            require_session(api).await?;
            let summary = api.dashboard().summary().await.map_err(Error::from)?;
            let mut value = to_json(&summary)?;
            if let (Some(hours), Value::Object(map)) = (summary.hours_logged(), &mut value) {
                map.insert("hours_logged".into(), json!(hours));
            }
            value
        }
        Command::MyDonations => {
            require_session(api).await?;
            let profile = api.auth().profile().await.map_err(Error::from)?;
            let donations = api
                .donations()
                .mine(&profile.email)
                .await
                .map_err(Error::from)?;
            to_json(&donations)?
        }
        Command::Donate {
            amount,
            name,
            email,
            message,
            campaign,
        } => {
            let intent = DonationIntent {
                amount,
                guest_name: name,
                guest_email: email,
                message,
                campaign,
            };
            to_json(&api.donations().initiate(&intent).await.map_err(Error::from)?)?
        }
    };
    Ok(value)
}

async fn require_session(api: &Api) -> Result<()> {
    if api.auth().is_authenticated().await {
        Ok(())
    } else {
        Err(Error::NotSignedIn)
    }
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(value)?)
}
