//! Account command handlers: `login`, `logout`, `whoami`, `register`.

use pacas_client::{AccountDetails, LeadGate, StateStore};
use tokio::io::{AsyncBufReadExt, BufReader};

pub(crate) async fn run_login<S: StateStore>(
    gate: &mut LeadGate<S>,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let user = gate.login(email, password).await?;
    println!("signed in as {}", user.email);
    Ok(())
}

pub(crate) async fn run_logout<S: StateStore>(gate: &mut LeadGate<S>) -> anyhow::Result<()> {
    gate.logout().await?;
    println!("signed out");
    Ok(())
}

pub(crate) async fn run_whoami<S: StateStore>(gate: &LeadGate<S>) -> anyhow::Result<()> {
    let status = gate.client().current_user().await?;
    match status.user.filter(|_| status.logged_in) {
        Some(user) => {
            println!("{}", user.email);
            if let Some(name) = user.name.as_deref() {
                println!("  name:     {name}");
            }
            if let Some(phone) = user.phone.as_deref() {
                println!("  phone:    {phone}");
            }
            println!(
                "  verified: {}",
                if user.email_verified { "yes" } else { "no" }
            );
        }
        None => println!("not signed in"),
    }
    let state = gate.lead_state();
    println!("properties viewed on this device: {}", state.view_count);
    Ok(())
}

/// Request a verification code, prompt for it on stdin, then create the account.
///
/// # Errors
///
/// Returns an error if the form fails validation, the backend refuses the
/// code or the registration, or stdin closes before a code is entered.
pub(crate) async fn run_register<S: StateStore>(
    gate: &mut LeadGate<S>,
    details: &AccountDetails,
) -> anyhow::Result<()> {
    let pending = gate.begin_registration(details).await?;
    println!("A 6-digit verification code was sent to {}", pending.email());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("verification code: ");
        let Some(line) = lines.next_line().await? else {
            anyhow::bail!("no verification code entered");
        };
        match gate.confirm_registration(&pending, &line, None).await {
            Ok(user) => {
                println!("account created for {}", user.email);
                break;
            }
            Err(pacas_client::ClientError::Validation(e)) => eprintln!("{e}"),
            Err(e) => return Err(e.into()),
        }
    }
    gate.flush_tracking().await;
    Ok(())
}
