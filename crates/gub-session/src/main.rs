//! Interactive sign-in that prints a portable SESSION_STRING.
//!
//! Run once on a trusted machine, then set the printed value in the
//! deployment's environment. Requires API_ID and API_HASH (env or `.env`).

use std::io::{self, BufRead, Write};

use grammers_client::{Client, InitParams, SignInError};
use grammers_session::Session;

use gub_core::errors::Error;
use gub_telegram::session::encode_session;

#[tokio::main]
async fn main() -> Result<(), gub_core::Error> {
    let _ = dotenvy::dotenv();

    let api_id = std::env::var("API_ID")
        .ok()
        .and_then(|s| s.trim().parse::<i32>().ok())
        .ok_or_else(|| Error::Config("API_ID must be set to a numeric application id".to_string()))?;
    let api_hash = std::env::var("API_HASH")
        .map_err(|_| Error::Config("API_HASH must be set".to_string()))?;

    println!("Signing in to generate a session string.");

    let client = Client::connect(grammers_client::Config {
        session: Session::new(),
        api_id,
        api_hash,
        params: InitParams::default(),
    })
    .await
    .map_err(|e| Error::Session(format!("connect failed: {e}")))?;

    let authorized = client
        .is_authorized()
        .await
        .map_err(|e| Error::Session(format!("authorization check failed: {e}")))?;

    if !authorized {
        let phone = prompt("Phone number (international format): ")?;
        let token = client
            .request_login_code(&phone)
            .await
            .map_err(|e| Error::Session(format!("login code request failed: {e}")))?;

        let code = prompt("Login code: ")?;
        match client.sign_in(&token, &code).await {
            Ok(_) => {}
            Err(SignInError::PasswordRequired(password_token)) => {
                let password = prompt("2FA password: ")?;
                client
                    .check_password(password_token, password.trim())
                    .await
                    .map_err(|e| Error::Session(format!("2FA check failed: {e}")))?;
            }
            Err(e) => return Err(Error::Session(format!("sign in failed: {e}"))),
        }
    }

    let encoded = encode_session(client.session());

    println!();
    println!("SESSION_STRING is ready:");
    println!("{encoded}");
    println!();
    println!("Set it as the SESSION_STRING environment variable of your deployment.");

    Ok(())
}

fn prompt(label: &str) -> gub_core::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
