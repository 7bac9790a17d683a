//! Session and registration commands.
//!
//! # Usage
//!
//! ```bash
//! om login -u buyer1 -p 'Abc12345' --referrer https://localhost/products/3
//! om whoami
//! om logout
//!
//! om check-username buyer2
//! om signup -u buyer2 -p 'Abc12345' --confirm 'Abc12345' -n "Kim Hodu" \
//!     --phone-middle 1234 --phone-last 5678 --accept-terms
//! ```

use clap::Args;
use open_market_core::{LoginForm, SignupErrors, SignupField, SignupForm};
use open_market_storefront::api::ApiError;
use open_market_storefront::error::{Result, clear_sentry_user};
use open_market_storefront::pages::{
    LoginOutcome, NavStatus, SignupError, UsernameCheck, submit_login, submit_signup,
};
use open_market_storefront::{AppError, OpenMarketClient};

/// Arguments for `om signup`.
#[derive(Args)]
pub struct SignupArgs {
    /// Username (letters and digits, at most 20)
    #[arg(short, long)]
    username: String,

    /// Password (8+ characters with upper and lower case letters and a digit)
    #[arg(short, long, env = "OPEN_MARKET_PASSWORD", hide_env_values = true)]
    password: String,

    /// Password again
    #[arg(long)]
    confirm: String,

    /// Display name
    #[arg(short, long)]
    name: String,

    /// Phone prefix
    #[arg(long, default_value = "010")]
    phone_prefix: String,

    /// Middle part of the phone number (3-4 digits)
    #[arg(long)]
    phone_middle: String,

    /// Last part of the phone number (4 digits)
    #[arg(long)]
    phone_last: String,

    /// Accept the terms of service
    #[arg(long)]
    accept_terms: bool,
}

pub async fn login(
    client: &OpenMarketClient,
    username: &str,
    password: &str,
    referrer: Option<&str>,
    site_host: &str,
) -> Result<()> {
    let mut form = LoginForm::new(username, password);
    match submit_login(client, &mut form, referrer, site_host).await? {
        LoginOutcome::Success { user, redirect } => {
            println!("Welcome, {}!", user.display_name());
            println!("Continue at {redirect}");
            Ok(())
        }
        LoginOutcome::Invalid(e) => Err(e.into()),
        LoginOutcome::Rejected => Err(ApiError::InvalidCredentials.into()),
    }
}

pub fn logout(client: &OpenMarketClient) -> Result<()> {
    client.logout()?;
    clear_sentry_user();
    println!("Logged out.");
    Ok(())
}

pub fn whoami(client: &OpenMarketClient) {
    let status = NavStatus::from_session(client.session());
    match client.session().user() {
        Some(user) if status == NavStatus::LoggedIn => {
            println!("{} ({})", user.display_name(), user.username);
        }
        _ => println!("Not logged in."),
    }
    println!("[{}] -> {}", status.label(), status.href());
}

fn single_error(field: SignupField, message: impl Into<String>) -> AppError {
    let mut errors = SignupErrors::default();
    errors.insert(field, message);
    SignupError::Invalid(errors).into()
}

pub async fn check_username(client: &OpenMarketClient, username: &str) -> Result<()> {
    let mut form = SignupForm::new();
    form.set_username(username);
    match open_market_storefront::pages::check_username(client, &mut form).await? {
        UsernameCheck::Available => {
            println!("{} is available.", form.username());
            Ok(())
        }
        UsernameCheck::Taken(message) => Err(single_error(SignupField::Username, message)),
        UsernameCheck::Invalid(e) => Err(single_error(SignupField::Username, e.to_string())),
    }
}

pub async fn signup(client: &OpenMarketClient, args: SignupArgs) -> Result<()> {
    let mut form = SignupForm::new();
    form.set_username(&args.username);
    form.password = args.password;
    form.password_confirm = args.confirm;
    form.name = args.name;
    form.phone_prefix = args.phone_prefix;
    form.phone_middle = args.phone_middle;
    form.phone_last = args.phone_last;
    form.terms_accepted = args.accept_terms;

    match open_market_storefront::pages::check_username(client, &mut form).await? {
        UsernameCheck::Available => {}
        UsernameCheck::Taken(message) => return Err(single_error(SignupField::Username, message)),
        UsernameCheck::Invalid(e) => {
            return Err(single_error(SignupField::Username, e.to_string()));
        }
    }

    submit_signup(client, &form).await?;
    println!("Account {} created. Log in with `om login`.", form.username());
    Ok(())
}
