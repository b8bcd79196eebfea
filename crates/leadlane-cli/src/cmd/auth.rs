//! `lane login` / `lane logout` / `lane whoami` — the auth boundary.
//!
//! The auth service itself is opaque; the CLI only keeps the returned
//! session blob in the user config dir so one-shot commands can report
//! who is signed in.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;

use leadlane_core::remote::{AuthService as _, Session};

use crate::demo::DemoEnv;
use crate::output::{OutputMode, render_mode, render_success};

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email. The demo backend ships `demo@leadlane.mx`.
    #[arg(long)]
    pub email: String,

    /// Account password (demo: `demo123`).
    #[arg(long)]
    pub password: String,

    /// Create the account first.
    #[arg(long)]
    pub sign_up: bool,
}

fn session_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("no user config directory")?;
    Ok(dir.join("leadlane").join("session.json"))
}

fn store_session(session: &Session) -> Result<()> {
    let path = session_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let blob = serde_json::to_string_pretty(session)?;
    std::fs::write(&path, blob).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn load_session() -> Result<Option<Session>> {
    let path = session_path()?;
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(serde_json::from_str(&raw).ok())
}

pub fn run_login(args: &LoginArgs, env: &DemoEnv, output: OutputMode) -> Result<()> {
    if args.sign_up {
        env.services
            .auth
            .sign_up(&args.email, &args.password)
            .map_err(leadlane_core::error::SyncError::from)?;
    }
    let session = env
        .services
        .auth
        .sign_in(&args.email, &args.password)
        .map_err(leadlane_core::error::SyncError::from)?;
    store_session(&session)?;
    render_success(output, &format!("Sesión iniciada como {}", session.email))
}

pub fn run_logout(env: &DemoEnv, output: OutputMode) -> Result<()> {
    env.services.auth.sign_out();
    let path = session_path()?;
    if path.exists() {
        std::fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
    }
    render_success(output, "Sesión cerrada")
}

pub fn run_whoami(output: OutputMode) -> Result<()> {
    let Some(session) = load_session()? else {
        bail!("no hay sesión activa (usa `lane login`)");
    };
    render_mode(
        output,
        &session,
        |session, w| {
            use std::io::Write as _;
            writeln!(w, "{}", session.email)
        },
        |session, w| {
            use std::io::Write as _;
            writeln!(w, "{} ({})", session.email, session.user_id)
        },
    )
}
