//! Line-oriented command shell on top of the core flows.
//!
//! Each input line is parsed with clap. Commands behind a guarded route are
//! checked against the session state first, the way the web front end gates
//! its pages.

use std::io::Write;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::debug;

use notekeeper_core::{AuthError, BootstrapOutcome, GuardDecision, Route};

use crate::app::App;

pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Parser)]
#[command(name = "notekeeper", no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the session state
    Status,
    /// Sign in with email and password
    Login { email: Option<String> },
    /// Email a one-time login code
    SendCode { email: Option<String> },
    /// Sign in with an emailed login code
    VerifyCode { code: String, email: Option<String> },
    /// Sign in with a Google ID token
    Google { credential: String },
    /// Sign out
    Logout,
    /// Create an account; a confirmation code is emailed
    Signup {
        email: String,
        /// Date of birth, YYYY-MM-DD
        dob: NaiveDate,
        #[arg(required = true, trailing_var_arg = true)]
        name: Vec<String>,
    },
    /// Confirm a new account with the emailed code
    ConfirmSignup { email: String, code: String },
    /// Email a new account confirmation code
    ResendSignup { email: String },
    /// Email a password reset code
    Forgot { email: String },
    /// Set a new password with the emailed reset code
    Reset { email: String, code: String },
    /// Show your profile
    Me,
    /// Finish setting up your profile
    CompleteProfile {
        /// Date of birth, YYYY-MM-DD
        dob: NaiveDate,
        #[arg(required = true, trailing_var_arg = true)]
        name: Vec<String>,
    },
    /// List your notes
    Notes,
    /// Add a note
    Add {
        #[arg(required = true, trailing_var_arg = true)]
        content: Vec<String>,
    },
    /// Replace a note's content
    Edit {
        id: String,
        #[arg(required = true, trailing_var_arg = true)]
        content: Vec<String>,
    },
    /// Delete a note
    Rm { id: String },
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

impl Command {
    /// The page this command belongs to, when that page is guarded.
    fn route(&self) -> Option<Route> {
        match self {
            Command::Me
            | Command::Notes
            | Command::Add { .. }
            | Command::Edit { .. }
            | Command::Rm { .. } => Some(Route::Dashboard),
            Command::CompleteProfile { .. } => Some(Route::CompleteProfile),
            _ => None,
        }
    }
}

pub fn print_bootstrap(app: &App, outcome: BootstrapOutcome) {
    match outcome {
        BootstrapOutcome::Authenticated { requires_profile_completion: true } => {
            println!("Signed in. Finish your profile with `complete-profile`.")
        }
        BootstrapOutcome::Authenticated { .. } => println!("Signed in."),
        BootstrapOutcome::Anonymous => match &app.config.last_email {
            Some(email) => println!("Not signed in. Use `login` or `send-code` ({}).", email),
            None => println!("Not signed in. Use `login <email>` or `signup`."),
        },
        BootstrapOutcome::TimedOut => {
            println!("Could not reach the server in time; continuing signed out.")
        }
    }
}

pub fn print_prompt(app: &App) {
    let state = app.session.state();
    let marker = if state.is_authenticated { "*" } else { "" };
    print!("notekeeper{}> ", marker);
    let _ = std::io::stdout().flush();
}

/// Report navigations the core forced, such as an expired session.
pub fn print_redirects(app: &App) {
    for route in app.take_redirects() {
        match route {
            Route::Login => println!("Your session has expired. Please log in again."),
            other => println!("-> {}", other),
        }
    }
}

/// Parse one input line. Note text is taken verbatim from the line rather
/// than rebuilt from whitespace-split words.
fn parse_line(input: &str) -> Result<Command, clap::Error> {
    let mut command = Line::try_parse_from(input.split_whitespace())?.command;
    match &mut command {
        Command::Add { content } => *content = vec![rest_after(input, 1).to_string()],
        Command::Edit { content, .. } => *content = vec![rest_after(input, 2).to_string()],
        _ => {}
    }
    Ok(command)
}

/// The remainder of `input` after `skip` whitespace-separated words.
fn rest_after(input: &str, skip: usize) -> &str {
    let mut rest = input.trim_start();
    for _ in 0..skip {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = rest[end..].trim_start();
    }
    rest
}

pub async fn run_line(app: &mut App, line: &str) -> Flow {
    let command = match parse_line(line) {
        Ok(command) => command,
        Err(e) => {
            let _ = e.print();
            return Flow::Continue;
        }
    };
    debug!(command = ?command, "Running command");

    if let Some(route) = command.route() {
        match app.guard(route) {
            GuardDecision::Allow => {}
            GuardDecision::Wait => {
                println!("Still checking your session, try again in a moment.");
                return Flow::Continue;
            }
            GuardDecision::Redirect(Route::Login) => {
                println!("Please log in first.");
                return Flow::Continue;
            }
            GuardDecision::Redirect(Route::Dashboard) => {
                println!("Your profile is already complete.");
                return Flow::Continue;
            }
            GuardDecision::Redirect(other) => {
                println!("-> {}", other);
                return Flow::Continue;
            }
        }
    }

    execute(app, command).await
}

async fn execute(app: &mut App, command: Command) -> Flow {
    match command {
        Command::Status => {
            let state = app.session.state();
            println!(
                "authenticated: {}, profile complete: {}, server: {}",
                state.is_authenticated,
                !state.requires_profile_completion,
                app.config.api_base_url
            );
        }
        Command::Login { email } => {
            let Some(email) = require_email(app, email) else {
                return Flow::Continue;
            };
            let Some(password) = prompt_password("Password: ").await else {
                return Flow::Continue;
            };
            let result = app.flows.login(&email, &password).await;
            signed_in(app, &email, result, "Login failed").await;
        }
        Command::SendCode { email } => {
            let Some(email) = require_email(app, email) else {
                return Flow::Continue;
            };
            match app.flows.send_login_otp(&email, &mut app.otp_cooldown).await {
                Ok(()) => {
                    app.remember_email(&email);
                    println!("Login code sent to {}.", email);
                }
                Err(e) => println!("{}", e.user_message("Failed to send OTP")),
            }
        }
        Command::VerifyCode { code, email } => {
            let Some(email) = require_email(app, email) else {
                return Flow::Continue;
            };
            let result = app.flows.verify_login_otp(&email, &code).await;
            signed_in(app, &email, result, "OTP login failed").await;
        }
        Command::Google { credential } => match app.flows.google_sign_in(&credential).await {
            Ok(route) => {
                println!("Google sign-in successful.");
                arrive(app, route).await;
            }
            Err(e) => println!("{}", e.user_message("Google login failed")),
        },
        Command::Logout => {
            let route = app.flows.logout().await;
            println!("Signed out.");
            arrive(app, route).await;
        }
        Command::Signup { email, dob, name } => {
            match app.flows.signup(&name.join(" "), &email, dob).await {
                Ok(()) => println!("Code sent to your email. Confirm with `confirm-signup`."),
                Err(e) => println!("{}", e.user_message("Signup failed")),
            }
        }
        Command::ConfirmSignup { email, code } => {
            match app.flows.verify_signup_otp(&email, &code).await {
                Ok(route) => {
                    app.remember_email(&email);
                    println!("Account created successfully!");
                    arrive(app, route).await;
                }
                Err(e) => println!("{}", e.user_message("Invalid or expired OTP")),
            }
        }
        Command::ResendSignup { email } => match app.flows.resend_signup_otp(&email).await {
            Ok(()) => println!("Code resent to your email."),
            Err(e) => println!("{}", e.user_message("Failed to resend OTP")),
        },
        Command::Forgot { email } => match app.flows.forgot_password(&email).await {
            Ok(route) => {
                println!("Reset code sent to your email. Continue with `reset {} <code>`.", email);
                debug!(next = %route, "Password reset requested");
            }
            Err(e) => println!("{}", e.user_message("Failed to send OTP")),
        },
        Command::Reset { email, code } => {
            let Some(password) = prompt_password("New password: ").await else {
                return Flow::Continue;
            };
            match app.flows.reset_password(&email, &code, &password).await {
                Ok(route) => {
                    println!("Password reset successful. Please login.");
                    arrive(app, route).await;
                }
                Err(e) => println!("{}", e.user_message("Reset failed")),
            }
        }
        Command::Me => match app.flows.me().await {
            Ok(user) => {
                println!("{} <{}>", user.display_name(), user.email);
                if let Some(dob) = user.date_of_birth() {
                    println!("born {}", dob);
                }
            }
            Err(e) => println!("{}", e.user_message("Failed to load user info")),
        },
        Command::CompleteProfile { dob, name } => {
            match app.flows.complete_profile(&name.join(" "), dob).await {
                Ok(route) => {
                    println!("Profile updated.");
                    arrive(app, route).await;
                }
                Err(e) => println!("{}", e.user_message("Update failed")),
            }
        }
        Command::Notes => list_notes(app).await,
        Command::Add { content } => match app.notes.add(&content.join(" ")).await {
            Ok(note) => println!("Note added [{}]", note.id),
            Err(e) => println!("{}", e),
        },
        Command::Edit { id, content } => match app.notes.update(&id, &content.join(" ")).await {
            Ok(()) => println!("Note updated"),
            Err(e) => println!("{}", e),
        },
        Command::Rm { id } => match app.notes.delete(&id).await {
            Ok(()) => println!("Note deleted"),
            Err(e) => println!("{}", e),
        },
        Command::Quit => return Flow::Quit,
    }
    Flow::Continue
}

fn require_email(app: &App, email: Option<String>) -> Option<String> {
    let email = app.email_or_last(email);
    if email.is_none() {
        println!("Enter your email first.");
    }
    email
}

async fn prompt_password(prompt: &'static str) -> Option<String> {
    match tokio::task::spawn_blocking(move || rpassword::prompt_password(prompt)).await {
        Ok(Ok(password)) => Some(password),
        Ok(Err(e)) => {
            println!("Could not read password: {}", e);
            None
        }
        Err(e) => {
            println!("Could not read password: {}", e);
            None
        }
    }
}

async fn signed_in(app: &mut App, email: &str, result: Result<Route, AuthError>, fallback: &str) {
    match result {
        Ok(route) => {
            app.remember_email(email);
            println!("Login successful!");
            arrive(app, route).await;
        }
        Err(e) => println!("{}", e.user_message(fallback)),
    }
}

/// Act on a navigation a flow asked for.
async fn arrive(app: &mut App, route: Route) {
    match app.guard(route) {
        GuardDecision::Allow if route == Route::Dashboard => list_notes(app).await,
        GuardDecision::Allow if route == Route::CompleteProfile => {
            println!("Finish your profile: complete-profile <YYYY-MM-DD> <name>")
        }
        _ => println!("-> {}", route),
    }
}

async fn list_notes(app: &mut App) {
    if let Err(e) = app.notes.fetch().await {
        println!("{}", e);
        return;
    }
    let notes = app.notes.notes();
    if notes.is_empty() {
        println!("No notes yet. Add one with `add <text>`.");
        return;
    }
    let now = Utc::now();
    for note in notes {
        let edited = if note.was_edited() { " (edited)" } else { "" };
        match note.updated_ago(now) {
            Some(ago) => println!("[{}] {}  - {}{}", note.id, note.content, ago, edited),
            None => println!("[{}] {}", note.id, note.content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Command, clap::Error> {
        parse_line(line)
    }

    #[test]
    fn test_parse_note_commands() {
        match parse("add buy milk and eggs").unwrap() {
            Command::Add { content } => assert_eq!(content.join(" "), "buy milk and eggs"),
            other => panic!("unexpected command: {other:?}"),
        }
        match parse("edit n1 call mom").unwrap() {
            Command::Edit { id, content } => {
                assert_eq!(id, "n1");
                assert_eq!(content.join(" "), "call mom");
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(parse("add").is_err());
    }

    #[test]
    fn test_note_text_keeps_its_spacing() {
        match parse("  add  two  spaces\tand a tab").unwrap() {
            Command::Add { content } => assert_eq!(content.join(" "), "two  spaces\tand a tab"),
            other => panic!("unexpected command: {other:?}"),
        }
        match parse("edit n1   indented    text").unwrap() {
            Command::Edit { id, content } => {
                assert_eq!(id, "n1");
                assert_eq!(content.join(" "), "indented    text");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rest_after() {
        assert_eq!(rest_after("edit n1  a  b", 2), "a  b");
        assert_eq!(rest_after("add", 1), "");
        assert_eq!(rest_after("  add x", 0), "add x");
    }

    #[test]
    fn test_parse_dates_and_aliases() {
        match parse("signup ada@example.com 1995-05-17 Ada Lovelace").unwrap() {
            Command::Signup { email, dob, name } => {
                assert_eq!(email, "ada@example.com");
                assert_eq!(dob, NaiveDate::from_ymd_opt(1995, 5, 17).unwrap());
                assert_eq!(name.join(" "), "Ada Lovelace");
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(parse("complete-profile 17/05/1995 Ada").is_err());
        assert!(matches!(parse("exit").unwrap(), Command::Quit));
        assert!(matches!(parse("verify-code 123456").unwrap(), Command::VerifyCode { email: None, .. }));
    }

    #[test]
    fn test_guarded_commands() {
        assert_eq!(parse("notes").unwrap().route(), Some(Route::Dashboard));
        assert_eq!(parse("rm n1").unwrap().route(), Some(Route::Dashboard));
        assert_eq!(
            parse("complete-profile 1995-05-17 Ada").unwrap().route(),
            Some(Route::CompleteProfile)
        );
        assert_eq!(parse("login").unwrap().route(), None);
    }
}
