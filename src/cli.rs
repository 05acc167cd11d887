//! Log in interactively from the command line.

use anyhow::Context;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password};

use crate::{blocking, Challenge, LoginOutcome, Session};

/// Supplies credentials and answers login challenges.
pub trait Prompt {
    /// `(username, password)`
    fn credentials(&mut self, for_what: &str) -> anyhow::Result<(String, String)>;

    /// A value for each field of the challenge, keyed by field id.
    fn interaction(&mut self, challenge: &Challenge) -> anyhow::Result<Vec<(String, String)>>;
}

/// Reads from the terminal, sensitive fields without echo.
#[derive(Debug, Default, Clone, Copy)]
pub struct Terminal;

impl Prompt for Terminal {
    fn credentials(&mut self, for_what: &str) -> anyhow::Result<(String, String)> {
        let theme = ColorfulTheme::default();
        eprintln!("Log into {}", for_what);

        let username = Input::<String>::with_theme(&theme)
            .with_prompt("Username")
            .interact_text()
            .context("read username")?;
        let password = Password::with_theme(&theme)
            .with_prompt("Password")
            .allow_empty_password(false)
            .report(false)
            .interact()
            .context("read password")?;

        Ok((username, password))
    }

    fn interaction(&mut self, challenge: &Challenge) -> anyhow::Result<Vec<(String, String)>> {
        let theme = ColorfulTheme::default();
        eprintln!("{}", challenge.message);

        challenge
            .fields()
            .map(|field| {
                let prompt = format!("{}({})", field.label, field.id);
                let value = if field.sensitive {
                    Password::with_theme(&theme)
                        .with_prompt(prompt)
                        .allow_empty_password(field.optional)
                        .report(false)
                        .interact()
                } else {
                    Input::<String>::with_theme(&theme)
                        .with_prompt(prompt)
                        .allow_empty(field.optional)
                        .interact_text()
                };
                let value = value.with_context(|| format!("read {}", field.id))?;
                Ok((field.id.clone(), value))
            })
            .collect()
    }
}

/// Run `f` on the blocking thread pool and hand the prompt back afterwards.
async fn run_blocking<P, T, F>(mut prompt: P, f: F) -> anyhow::Result<(P, T)>
where
    P: Send + 'static,
    T: Send + 'static,
    F: FnOnce(&mut P) -> anyhow::Result<T> + Send + 'static,
{
    let (prompt, result) = tokio::task::spawn_blocking(move || {
        let result = f(&mut prompt);
        (prompt, result)
    })
    .await
    .context("prompt task panicked")?;
    Ok((prompt, result?))
}

/// Log in, answering every challenge the server comes up with.
///
/// Returns the name of the logged in user.
pub async fn login<P>(session: &Session, prompt: P, for_what: &str) -> anyhow::Result<String>
where
    P: Prompt + Send + 'static,
{
    let for_what = for_what.to_string();
    let (mut prompt, (username, password)) =
        run_blocking(prompt, move |p| p.credentials(&for_what)).await?;

    let mut outcome = session
        .login(&username, &password)
        .await
        .context("log in")?;

    loop {
        match outcome {
            LoginOutcome::Authenticated { username } => return Ok(username),
            LoginOutcome::NeedsInteraction(challenge) => {
                let login_token = challenge.login_token.clone();
                let (p, values) = run_blocking(prompt, move |p| p.interaction(&challenge)).await?;
                prompt = p;
                outcome = session
                    .continue_login(&login_token, values)
                    .await
                    .context("continue login")?;
            }
        }
    }
}

/// [`login`] for a [`blocking::Session`].
pub fn login_blocking(
    session: &blocking::Session,
    prompt: &mut impl Prompt,
    for_what: &str,
) -> anyhow::Result<String> {
    let (username, password) = prompt.credentials(for_what)?;
    let mut outcome = session.login(&username, &password).context("log in")?;

    loop {
        match outcome {
            LoginOutcome::Authenticated { username } => return Ok(username),
            LoginOutcome::NeedsInteraction(challenge) => {
                let values = prompt.interaction(&challenge)?;
                outcome = session
                    .continue_login(&challenge.login_token, values)
                    .context("continue login")?;
            }
        }
    }
}
